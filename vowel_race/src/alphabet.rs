use thiserror::Error;

pub const DEFAULT_VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    #[error("alphabet must contain at least one symbol")]
    Empty,
    #[error("symbol {0:?} is not a letter")]
    NotALetter(char),
    #[error("symbol {0:?} appears more than once")]
    Duplicate(char),
}

/// Ordered set of lower-case symbols searched for in a round.
///
/// Declaration order matters: it decides which symbol wins a tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Alphabet, AlphabetError> {
        let mut validated: Vec<char> = Vec::new();
        for symbol in symbols {
            if !symbol.is_alphabetic() {
                return Err(AlphabetError::NotALetter(symbol));
            }
            let symbol = to_lower(symbol);
            if validated.contains(&symbol) {
                return Err(AlphabetError::Duplicate(symbol));
            }
            validated.push(symbol);
        }
        if validated.is_empty() {
            return Err(AlphabetError::Empty);
        }
        Ok(Alphabet { symbols: validated })
    }

    pub fn vowels() -> Alphabet {
        Alphabet { symbols: DEFAULT_VOWELS.to_vec() }
    }

    pub fn index_of(&self, symbol: char) -> Option<usize> {
        let symbol = to_lower(symbol);
        self.symbols.iter().position(|s| *s == symbol)
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::vowels()
    }
}

/// Single-char lower-casing; symbols whose lower case expands to
/// several chars keep their first one.
pub fn to_lower(symbol: char) -> char {
    symbol.to_lowercase().next().unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowels_are_in_declaration_order() {
        let alphabet = Alphabet::vowels();
        assert_eq!(alphabet.symbols(), &['a', 'e', 'i', 'o', 'u']);
        assert_eq!(alphabet.len(), 5);
    }

    #[test]
    fn symbols_are_lowercased_and_looked_up_case_insensitively() {
        let alphabet = Alphabet::new("XyZ".chars()).unwrap();
        assert_eq!(alphabet.symbols(), &['x', 'y', 'z']);
        assert_eq!(alphabet.index_of('Y'), Some(1));
        assert_eq!(alphabet.index_of('q'), None);
    }

    #[test]
    fn rejects_invalid_alphabets() {
        assert_eq!(Alphabet::new(std::iter::empty()), Err(AlphabetError::Empty));
        assert_eq!(Alphabet::new("a1".chars()), Err(AlphabetError::NotALetter('1')));
        assert_eq!(Alphabet::new("aeA".chars()), Err(AlphabetError::Duplicate('a')));
    }
}
