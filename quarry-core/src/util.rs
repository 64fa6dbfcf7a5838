use std::{
    cmp::min,
    fmt::{self, Display},
};

/// Writes `values` into `out` through `f`, inserting `separator` between the
/// fragments that actually produced output.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub struct Truncated<'s>(pub &'s str);

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LIMIT: usize = 497;
        let mut cut = min(self.0.len(), LIMIT);
        while !self.0.is_char_boundary(cut) {
            cut -= 1;
        }
        write!(
            f,
            "{}{}",
            self.0[..cut].trim_end(),
            if self.0.len() > LIMIT { "..." } else { "" },
        )
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::Truncated($query.as_ref())
    };
}

/// Builds a `BTreeMap<String, Value>` out of `key => value` pairs, converting
/// every value through [`Value::from`](crate::Value).
#[macro_export]
macro_rules! attrs {
    () => {
        ::std::collections::BTreeMap::<::std::string::String, $crate::Value>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut macro_local_map =
            ::std::collections::BTreeMap::<::std::string::String, $crate::Value>::new();
        $(macro_local_map.insert($key.into(), $crate::Value::from($value));)+
        macro_local_map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_skips_empty_fragments() {
        let mut out = String::new();
        separated_by(
            &mut out,
            ["a", "", "b", "c"],
            |out, v| out.push_str(v),
            ", ",
        );
        assert_eq!(out, "a, b, c");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let short = format!("{}", Truncated("SELECT 1"));
        assert_eq!(short, "SELECT 1");
        let long = "é".repeat(400);
        let truncated = format!("{}", Truncated(&long));
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 500);
    }
}
