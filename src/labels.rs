use crate::error::Error;

/// Output vocabulary of the trained network, in training order. Positional:
/// logit i maps to `CLASSES[i]`, so the order must never change independently
/// of the weights artifact.
pub const CLASSES: [&str; 80] = [
    "!", "(", ")", "+", ",", "-", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "=", "A", "C", "Delta", "G", "H", "M", "N", "R", "S", "T", "X", "[", "]", "alpha",
    "b", "beta", "cos", "d", "div", "e", "exists", "f", "forall", "forward_slash", "gamma",
    "geq", "gt", "i", "in", "infty", "int", "j", "k", "l", "lambda", "ldots", "leq", "lim", "log",
    "lt", "mu", "neq", "o", "p", "phi", "pi", "pm", "prime", "q", "rightarrow", "sigma", "sin", "sqrt",
    "sum", "tan", "theta", "u", "v", "w", "y", "z", "{", "}",
];

/// Positional lookup into the vocabulary.
pub fn label_of(index: usize) -> Result<&'static str, Error> {
    CLASSES.get(index).copied().ok_or(Error::Index {
        index,
        len: CLASSES.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_80_nonempty_labels() {
        assert_eq!(CLASSES.len(), 80);
        for label in CLASSES {
            assert!(!label.is_empty());
        }
    }

    #[test]
    fn lookup_is_positional() {
        assert_eq!(label_of(0).unwrap(), "!");
        assert_eq!(label_of(13).unwrap(), "7");
        assert_eq!(label_of(30).unwrap(), "alpha");
        assert_eq!(label_of(79).unwrap(), "}");
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        match label_of(80) {
            Err(Error::Index { index, len }) => {
                assert_eq!(index, 80);
                assert_eq!(len, 80);
            }
            other => panic!("expected index error, got {:?}", other.map(|s| s.to_string())),
        }
    }
}
