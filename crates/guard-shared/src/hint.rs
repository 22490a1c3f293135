//! Coaching hint vocabulary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HintCode {
    RaiseGuard,
    LowerChin,
    MoveLeft,
    MoveRight,
    GoodStance,
    BlockHigh,
    /// Part of the vocabulary; no current rule emits it
    BlockLow,
}

impl HintCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintCode::RaiseGuard => "RAISE_GUARD",
            HintCode::LowerChin => "LOWER_CHIN",
            HintCode::MoveLeft => "MOVE_LEFT",
            HintCode::MoveRight => "MOVE_RIGHT",
            HintCode::GoodStance => "GOOD_STANCE",
            HintCode::BlockHigh => "BLOCK_HIGH",
            HintCode::BlockLow => "BLOCK_LOW",
        }
    }

    /// Text shown to the trainee
    pub fn message(&self) -> &'static str {
        match self {
            HintCode::RaiseGuard => "Raise your guard higher",
            HintCode::LowerChin => "Keep your chin down",
            HintCode::MoveLeft => "Move to the left",
            HintCode::MoveRight => "Move to the right",
            HintCode::GoodStance => "Perfect stance!",
            HintCode::BlockHigh => "Block high",
            HintCode::BlockLow => "Block low",
        }
    }

    /// Codes that count as a block or punch in the session tally
    pub fn is_strike(&self) -> bool {
        matches!(self, HintCode::BlockHigh | HintCode::BlockLow)
    }
}

impl std::fmt::Display for HintCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

/// One coaching directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub code: HintCode,
    pub severity: Severity,
}

impl Hint {
    pub const fn new(code: HintCode, severity: Severity) -> Self {
        Self { code, severity }
    }

    pub const fn info(code: HintCode) -> Self {
        Self::new(code, Severity::Info)
    }

    pub const fn warn(code: HintCode) -> Self {
        Self::new(code, Severity::Warn)
    }

    pub fn message(&self) -> &'static str {
        self.code.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_wire_format() {
        let json = serde_json::to_string(&Hint::warn(HintCode::RaiseGuard)).unwrap();
        assert_eq!(json, r#"{"code":"RAISE_GUARD","severity":"warn"}"#);
    }

    #[test]
    fn test_strike_codes() {
        assert!(HintCode::BlockHigh.is_strike());
        assert!(HintCode::BlockLow.is_strike());
        assert!(!HintCode::GoodStance.is_strike());
        assert!(!HintCode::RaiseGuard.is_strike());
    }
}
