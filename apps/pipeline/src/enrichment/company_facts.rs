//! Company facts grammar — parses the free-text headcount and funding strings
//! the enrichment service returns.
//!
//! ```text
//! headcount := qualifier* quantity ( range_sep quantity )? '+'? word*
//! quantity  := NUMBER scale?
//! funding   := ( amount | stage | filler )+        at least one amount or stage
//! amount    := currency? NUMBER scale currency?    currency or scale required
//!            | currency NUMBER currency?
//! stage     := 'pre' '-'? 'seed' | 'seed' | 'angel' | 'series' LETTER
//!            | 'ipo' | 'public' | 'listed' | 'acquired' | 'bootstrapped' | 'private'
//! ```
//!
//! Bare numbers in funding text are skipped (they are usually years).
//! Placeholder text ("Unknown", "N/A") and anything outside the grammar yield `None`.

use serde::Serialize;

const PLACEHOLDERS: &[&str] = &["unknown", "n/a", "na", "none", "null", "not available", "-"];
const APPROXIMATE_WORDS: &[&str] = &["approx", "approximately", "about", "around", "nearly", "roughly"];
const OPEN_ENDED_WORDS: &[&str] = &["over", "more", "than", "above"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headcount {
    pub min: u64,
    /// `None` for open-ended counts such as "10,000+".
    pub max: Option<u64>,
    pub approximate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Money {
    pub currency: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingStage {
    PreSeed,
    Seed,
    Angel,
    Series(char),
    Public,
    Acquired,
    Bootstrapped,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Funding {
    pub amount: Option<Money>,
    pub stage: Option<FundingStage>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Word(String),
    Symbol(char),
}

pub fn is_placeholder(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    text.is_empty() || PLACEHOLDERS.contains(&text.as_str())
}

pub fn parse_headcount(text: &str) -> Option<Headcount> {
    if is_placeholder(text) {
        return None;
    }
    let mut parser = Parser::new(tokenize(text));

    let mut approximate = false;
    let mut open_ended = false;
    loop {
        match parser.peek() {
            Some(Token::Symbol('~')) => approximate = true,
            Some(Token::Word(w)) if APPROXIMATE_WORDS.contains(&w.as_str()) => approximate = true,
            Some(Token::Word(w)) if OPEN_ENDED_WORDS.contains(&w.as_str()) => open_ended = true,
            // "approx."
            Some(Token::Symbol('.')) if approximate => {}
            _ => break,
        }
        parser.advance();
    }

    let min = parser.quantity()?;
    let mut max = Some(min);

    if parser.range_separator() {
        let upper = parser.quantity()?;
        if upper < min {
            return None;
        }
        max = Some(upper);
    }
    if parser.eat_symbol('+') {
        open_ended = true;
    }
    if open_ended {
        max = None;
    }

    // Trailing descriptive words ("employees", "globally") are fine; anything else is not.
    while let Some(token) = parser.advance() {
        if !matches!(token, Token::Word(_) | Token::Symbol('(') | Token::Symbol(')')) {
            return None;
        }
    }

    Some(Headcount {
        min: min as u64,
        max: max.map(|m| m as u64),
        approximate,
    })
}

pub fn parse_funding(text: &str) -> Option<Funding> {
    if is_placeholder(text) {
        return None;
    }
    let mut parser = Parser::new(tokenize(text));
    let mut amount = None;
    let mut stage = None;

    while parser.peek().is_some() {
        if let Some(found) = parser.stage() {
            stage.get_or_insert(found);
        } else if let Some(found) = parser.amount() {
            amount.get_or_insert(found);
        } else {
            parser.advance();
        }
    }

    if amount.is_none() && stage.is_none() {
        return None;
    }
    Some(Funding { amount, stage })
}

fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let mut digits = String::new();
            while i < chars.len() {
                let ch = chars[i];
                let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                if ch.is_ascii_digit() {
                    digits.push(ch);
                } else if ch == ',' && next_is_digit {
                    // thousands separator
                } else if ch == '.' && next_is_digit && !digits.contains('.') {
                    digits.push(ch);
                } else {
                    break;
                }
                i += 1;
            }
            match digits.parse::<f64>() {
                Ok(n) => tokens.push(Token::Number(n)),
                Err(_) => tokens.push(Token::Word(digits)),
            }
        } else if c.is_alphabetic() {
            let mut word = String::new();
            while i < chars.len() && chars[i].is_alphabetic() {
                word.extend(chars[i].to_lowercase());
                i += 1;
            }
            tokens.push(Token::Word(word));
        } else {
            tokens.push(Token::Symbol(if c == '–' || c == '—' { '-' } else { c }));
            i += 1;
        }
    }
    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Word(w)) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<f64> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.pos += 1;
                Some(n)
            }
            _ => None,
        }
    }

    fn scale(&mut self) -> Option<f64> {
        let factor = match self.peek() {
            Some(Token::Word(w)) => scale_factor(w)?,
            _ => return None,
        };
        self.pos += 1;
        Some(factor)
    }

    fn quantity(&mut self) -> Option<f64> {
        let n = self.number()?;
        Some(n * self.scale().unwrap_or(1.0))
    }

    fn range_separator(&mut self) -> bool {
        self.eat_symbol('-') || self.eat_word("to")
    }

    fn currency(&mut self) -> Option<String> {
        let code = match self.peek() {
            Some(Token::Symbol(s)) => symbol_currency(*s)?,
            Some(Token::Word(w)) => word_currency(w)?,
            _ => return None,
        };
        self.pos += 1;
        Some(code.to_string())
    }

    /// Tries `amount`; rewinds when the tokens do not form one.
    fn amount(&mut self) -> Option<Money> {
        let start = self.pos;
        let leading = self.currency();
        let Some(number) = self.number() else {
            self.pos = start;
            return None;
        };
        let scale = self.scale();
        let trailing = self.currency();
        let currency = leading.or(trailing);

        if currency.is_none() && scale.is_none() {
            // A bare number, most likely a year.
            self.pos = start;
            return None;
        }
        Some(Money {
            currency,
            value: number * scale.unwrap_or(1.0),
        })
    }

    fn stage(&mut self) -> Option<FundingStage> {
        let Some(Token::Word(word)) = self.peek() else {
            return None;
        };
        let (stage, width) = match word.as_str() {
            "pre" => {
                let offset = if self.peek_at(1) == Some(&Token::Symbol('-')) { 2 } else { 1 };
                match self.peek_at(offset) {
                    Some(Token::Word(w)) if w == "seed" => (FundingStage::PreSeed, offset + 1),
                    _ => return None,
                }
            }
            "seed" => (FundingStage::Seed, 1),
            "angel" => (FundingStage::Angel, 1),
            "series" => match self.peek_at(1) {
                Some(Token::Word(letter)) if letter.chars().count() == 1 => {
                    let round = letter.chars().next()?.to_ascii_uppercase();
                    if !('A'..='J').contains(&round) {
                        return None;
                    }
                    (FundingStage::Series(round), 2)
                }
                _ => return None,
            },
            "ipo" | "public" | "publicly" | "listed" => (FundingStage::Public, 1),
            "acquired" => (FundingStage::Acquired, 1),
            "bootstrapped" => (FundingStage::Bootstrapped, 1),
            "private" | "privately" => (FundingStage::Private, 1),
            _ => return None,
        };
        self.pos += width;
        Some(stage)
    }
}

fn scale_factor(word: &str) -> Option<f64> {
    let factor = match word {
        "k" | "thousand" => 1e3,
        "l" | "lakh" | "lakhs" | "lac" => 1e5,
        "m" | "mn" | "mm" | "million" | "millions" => 1e6,
        "cr" | "crore" | "crores" => 1e7,
        "b" | "bn" | "billion" | "billions" => 1e9,
        _ => return None,
    };
    Some(factor)
}

fn symbol_currency(symbol: char) -> Option<&'static str> {
    let code = match symbol {
        '$' => "USD",
        '€' => "EUR",
        '£' => "GBP",
        '₹' => "INR",
        '¥' => "JPY",
        _ => return None,
    };
    Some(code)
}

fn word_currency(word: &str) -> Option<&'static str> {
    let code = match word {
        "usd" => "USD",
        "eur" => "EUR",
        "gbp" => "GBP",
        "inr" | "rs" => "INR",
        "jpy" => "JPY",
        _ => return None,
    };
    Some(code)
}
