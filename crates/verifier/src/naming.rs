//! Unique name generation.

/// A numbering strategy for making names unique.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameGenerator {
    /// `name`, `name2`, `name3` ...
    #[default]
    Numbered,
    /// `name1`, `name2`, `name3` ...
    NumberedFromOne,
    /// `name`, `name_1`, `name_2` ...
    UnderscoreNumbered,
}

impl NameGenerator {
    /// Returns the `n`-th candidate for the base name (`n` starts at zero).
    pub fn candidate(self, base: &str, n: usize) -> String {
        match (self, n) {
            (NameGenerator::Numbered, 0) => base.to_owned(),
            (NameGenerator::Numbered, n) => format!("{base}{}", n + 1),
            (NameGenerator::NumberedFromOne, n) => format!("{base}{}", n + 1),
            (NameGenerator::UnderscoreNumbered, 0) => base.to_owned(),
            (NameGenerator::UnderscoreNumbered, n) => format!("{base}_{n}"),
        }
    }

    /// Returns the first candidate for the base name that `is_reserved` rejects.
    pub fn ensure_unique_name<F>(self, base: &str, is_reserved: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        (0..)
            .map(|n| self.candidate(base, n))
            .find(|name| !is_reserved(name))
            .unwrap_or_else(|| base.to_owned())
    }

    /// Returns `count` unique names for the base name that `is_reserved` rejects.
    pub fn unique_names<F>(self, base: &str, count: usize, is_reserved: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut names: Vec<String> = Vec::with_capacity(count);
        for _ in 0..count {
            let name =
                self.ensure_unique_name(base, |name| is_reserved(name) || names.iter().any(|it| it == name));
            names.push(name);
        }
        names
    }
}
