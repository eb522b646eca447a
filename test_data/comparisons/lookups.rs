//! Lookups in a string to number map.

use std::collections::HashMap;

pub fn find(map: &HashMap<String, u32>, key: &str) -> Option<u32> {
    map.get(key).copied()
}

pub fn is_missing(map: &HashMap<String, u32>, key: &str) -> bool {
    find(map, key) == None
}

pub fn is_present(map: &HashMap<String, u32>, key: &str) -> bool {
    None != find(map, key)
}

pub fn is_empty(map: &HashMap<String, u32>) -> bool {
    map.is_empty() == true
}

pub fn is_full(map: &HashMap<String, u32>, capacity: usize) -> bool {
    (map.len() >= capacity) != false
}

pub fn count(map: &HashMap<String, u32>, keys: &[&str]) -> usize {
    let mut n = 0;
    for key in keys {
        if find(map, key) != None {
            n += 1;
        }
    }
    n
}
