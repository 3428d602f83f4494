//! The nested configuration document and its structural traversal.
//!
//! A [`Document`] is a YAML mapping. Values found at a key are viewed through
//! [`Slot`], a tagged variant over the four shapes the traverser and the merge
//! policy care about. Both consult the same table of cases, so every shape is
//! handled explicitly:
//!
//! | Slot        | Traversal (ancestor key)     | Merge (terminal key)       |
//! |-------------|------------------------------|----------------------------|
//! | `Missing`   | new empty mapping            | new value(s)               |
//! | `Map`       | descend unchanged            | `[map, new..]`             |
//! | `Scalar`    | `{matrix: [scalar]}`         | `[scalar, new..]`          |
//! | `Sequence`  | `{matrix: sequence}`         | `sequence ++ new`          |
//!
//! Coercion keeps the prior value under a recognizable `matrix` key instead
//! of dropping it.

use serde_yaml::{Mapping, Value};

/// Key under which a non-mapping value is preserved when the traverser has to
/// turn it into a mapping.
pub const MATRIX_KEY: &str = "matrix";

/// A loaded configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML text. Anything whose top level is not a mapping (an empty
    /// file, a bare scalar, a list) yields an empty document.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        match serde_yaml::from_str::<Value>(content)? {
            Value::Mapping(root) => Ok(Self { root }),
            _ => Ok(Self::new()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.root)
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Read-only lookup along `path`. Never modifies the document.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (last, ancestors) = path.split_last()?;
        let mut current = &self.root;
        for key in ancestors {
            current = current.get(key.as_ref())?.as_mapping()?;
        }
        current.get(last.as_ref())
    }

    /// Walk `ancestors` from the root and return the mapping they lead to,
    /// creating or coercing nodes on the way (see the module table).
    ///
    /// With no ancestors the root mapping itself is returned.
    pub fn parent_mut<S: AsRef<str>>(&mut self, ancestors: &[S]) -> &mut Mapping {
        let mut current = &mut self.root;
        for key in ancestors {
            let slot = current
                .entry(Value::String(key.as_ref().to_owned()))
                .or_insert(Value::Null);
            current = coerce_to_mapping(slot);
        }
        current
    }
}

/// Replace `slot` in place with its mapping form and return that mapping.
fn coerce_to_mapping(slot: &mut Value) -> &mut Mapping {
    if !slot.is_mapping() {
        let taken = std::mem::replace(slot, Value::Null);
        *slot = Value::Mapping(Slot::from_value(taken).into_mapping());
    }
    let Value::Mapping(mapping) = slot else {
        unreachable!("slot holds a mapping after coercion");
    };
    mapping
}

/// The shape of whatever currently occupies a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Absent, or explicitly `null`.
    Missing,
    Map(Mapping),
    /// Strings, numbers, booleans and tagged values.
    Scalar(Value),
    Sequence(Vec<Value>),
}

impl Slot {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Slot::Missing,
            Value::Mapping(mapping) => Slot::Map(mapping),
            Value::Sequence(seq) => Slot::Sequence(seq),
            scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Tagged(_)) => {
                Slot::Scalar(scalar)
            }
        }
    }

    /// Move the value at `key` out of `parent`, leaving `null` in its place so
    /// that writing back keeps the key's position.
    pub fn take(parent: &mut Mapping, key: &str) -> Self {
        match parent.get_mut(key) {
            Some(value) => Slot::from_value(std::mem::replace(value, Value::Null)),
            None => Slot::Missing,
        }
    }

    /// Traversal coercion: every shape becomes a mapping.
    fn into_mapping(self) -> Mapping {
        match self {
            Slot::Missing => Mapping::new(),
            Slot::Map(mapping) => mapping,
            Slot::Scalar(scalar) => matrix(vec![scalar]),
            Slot::Sequence(seq) => matrix(seq),
        }
    }
}

fn matrix(items: Vec<Value>) -> Mapping {
    let mut mapping = Mapping::new();
    mapping.insert(Value::String(MATRIX_KEY.into()), Value::Sequence(items));
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::doc;

    #[test]
    fn parse_mapping() {
        let d = doc("language: rust\nenv:\n  global: []\n");
        assert_eq!(d.root().len(), 2);
        assert_eq!(d.get_path(&["language"]).unwrap().as_str(), Some("rust"));
    }

    #[test]
    fn parse_non_mapping_is_empty() {
        assert!(Document::parse("").unwrap().is_empty());
        assert!(Document::parse("~\n").unwrap().is_empty());
        assert!(Document::parse("- a\n- b\n").unwrap().is_empty());
        assert!(Document::parse("just a string").unwrap().is_empty());
    }

    #[test]
    fn parse_invalid_yaml_errors() {
        assert!(Document::parse("a: [unclosed\n").is_err());
    }

    #[test]
    fn empty_ancestors_return_root() {
        let mut d = doc("a: 1\n");
        let parent = d.parent_mut::<&str>(&[]);
        assert_eq!(parent.len(), 1);
        assert!(parent.contains_key("a"));
    }

    #[test]
    fn missing_keys_become_mappings() {
        let mut d = Document::new();
        d.parent_mut(&["a", "b", "c"]);
        assert_eq!(d, doc("a:\n  b:\n    c: {}\n"));
    }

    #[test]
    fn existing_mapping_is_descended_unchanged() {
        let mut d = doc("env:\n  global: x\n  other: y\n");
        let parent = d.parent_mut(&["env"]);
        assert_eq!(parent.len(), 2);
        assert_eq!(d, doc("env:\n  global: x\n  other: y\n"));
    }

    #[test]
    fn scalar_mid_path_moves_under_matrix() {
        let mut d = doc("env: FOO=bar\n");
        d.parent_mut(&["env"]);
        assert_eq!(d, doc("env:\n  matrix:\n    - FOO=bar\n"));
    }

    #[test]
    fn sequence_mid_path_moves_under_matrix_as_is() {
        let mut d = doc("env:\n  - A=1\n  - B=2\n");
        d.parent_mut(&["env"]);
        assert_eq!(d, doc("env:\n  matrix:\n    - A=1\n    - B=2\n"));
    }

    #[test]
    fn null_counts_as_missing() {
        let mut d = doc("env: ~\n");
        d.parent_mut(&["env"]);
        assert_eq!(d, doc("env: {}\n"));
    }

    #[test]
    fn every_ancestor_is_a_mapping_afterwards() {
        let mut d = doc("a:\n  b: 3\n");
        d.parent_mut(&["a", "b", "c", "d"]);
        let mut current = d.root();
        for key in ["a", "b", "c", "d"] {
            current = current.get(key).and_then(Value::as_mapping).unwrap();
        }
        assert_eq!(
            d.get_path(&["a", "b", "matrix"]),
            Some(&Value::Sequence(vec![Value::Number(3.into())]))
        );
    }

    #[test]
    fn coercion_keeps_key_position() {
        let mut d = doc("first: 1\nenv: x\nlast: 2\n");
        d.parent_mut(&["env"]);
        let keys: Vec<&str> = d.root().keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["first", "env", "last"]);
    }

    #[test]
    fn get_path_is_read_only() {
        let d = doc("repos: {}\n");
        assert!(d.get_path(&["repos", "octo/cat", "endpoint"]).is_none());
        assert_eq!(d, doc("repos: {}\n"));
    }

    #[test]
    fn get_path_does_not_look_through_scalars() {
        let d = doc("repos: nope\n");
        assert!(d.get_path(&["repos", "octo/cat"]).is_none());
    }

    #[test]
    fn slot_classification() {
        assert_eq!(Slot::from_value(Value::Null), Slot::Missing);
        assert!(matches!(Slot::from_value(Value::Bool(true)), Slot::Scalar(_)));
        assert!(matches!(
            Slot::from_value(Value::String("x".into())),
            Slot::Scalar(_)
        ));
        assert!(matches!(
            Slot::from_value(Value::Sequence(vec![])),
            Slot::Sequence(_)
        ));
        assert!(matches!(
            Slot::from_value(Value::Mapping(Mapping::new())),
            Slot::Map(_)
        ));
    }

    #[test]
    fn slot_take_leaves_null_behind() {
        let mut m = doc("a: 1\nb: 2\n").root().clone();
        let taken = Slot::take(&mut m, "a");
        assert_eq!(taken, Slot::Scalar(Value::Number(1.into())));
        assert_eq!(m.get("a"), Some(&Value::Null));
        assert_eq!(Slot::take(&mut m, "zzz"), Slot::Missing);
    }

    #[test]
    fn yaml_round_trip_keeps_order() {
        let d = doc("z: 1\na: 2\nm: 3\n");
        let again = Document::parse(&d.to_yaml().unwrap()).unwrap();
        let keys: Vec<&str> = again.root().keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
