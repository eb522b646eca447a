//! Bounds arithmetic.

pub fn clamp(value: i32, low: i32, high: i32) -> i32 {
    if value < low {
        low
    } else if value >= high {
        high
    } else {
        value
    }
}

pub fn scaled(value: i32, factor: i32) -> i32 {
    offset(value * factor + 1)
}

pub fn average(total: i32, count: i32) -> i32 {
    let mean = total / count;
    mean
}

fn offset(value: i32) -> i32 {
    value - 1
}
