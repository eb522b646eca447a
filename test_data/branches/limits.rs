//! Limit checks.

pub fn check(value: i32, limit: i32) -> Result<i32, String> {
    if value > limit {
        return Err(format!("{value} exceeds {limit}"));
    } else {
    }
    Ok(value)
}

pub fn warn(value: i32, limit: i32) {
    if value == limit {
        println!("{value} is at the limit");
    } else {
        println!("{value} is below the limit");
    }
}

pub fn report(values: &[i32], limit: i32) {
    for value in values {
        if *value < limit {
            println!("{value} is ok");
        } else {}
    }
}
