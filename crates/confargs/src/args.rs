//! the synthesized command line
use serde::{ser::SerializeSeq, Serializer};
use std::collections::TryReserveError;

/// Owned list of arguments, element 0 is the program name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentList {
    args: Vec<String>,
}

impl ArgumentList {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            args: vec![program_name.into()],
        }
    }

    /// Append an argument, failing instead of aborting when memory runs out
    pub fn push(&mut self, arg: String) -> Result<(), TryReserveError> {
        self.args.try_reserve(1)?;
        self.args.push(arg);
        Ok(())
    }

    pub fn program_name(&self) -> &str {
        &self.args[0]
    }

    /// Number of arguments including the program name (`argc`)
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Always false, the program name is always present
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.args.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }

    /// Release the list and every argument in it
    pub fn release(self) {
        drop(self)
    }
}

impl AsRef<[String]> for ArgumentList {
    fn as_ref(&self) -> &[String] {
        &self.args
    }
}

impl IntoIterator for ArgumentList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArgumentList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

impl serde::ser::Serialize for ArgumentList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_seq(Some(self.args.len()))?;
        for arg in &self.args {
            ser.serialize_element(arg)?;
        }
        ser.end()
    }
}
