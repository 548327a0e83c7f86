//! Compound-assignment and binary operator correspondence.

use std::fmt;

/// The compound assignment operators that have a binary counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Xor,
    LeftShift,
    RightShift,
}

/// Binary operators that can be folded into a compound assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    ExclusiveOr,
    LeftShift,
    RightShift,
}

impl CompoundOperator {
    pub const ALL: [CompoundOperator; 10] = [
        CompoundOperator::Add,
        CompoundOperator::Subtract,
        CompoundOperator::Multiply,
        CompoundOperator::Divide,
        CompoundOperator::Modulo,
        CompoundOperator::And,
        CompoundOperator::Or,
        CompoundOperator::Xor,
        CompoundOperator::LeftShift,
        CompoundOperator::RightShift,
    ];

    /// Parses a compound assignment token. `=`, `??=` and `>>>=` are not supported.
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+=" => CompoundOperator::Add,
            "-=" => CompoundOperator::Subtract,
            "*=" => CompoundOperator::Multiply,
            "/=" => CompoundOperator::Divide,
            "%=" => CompoundOperator::Modulo,
            "&=" => CompoundOperator::And,
            "|=" => CompoundOperator::Or,
            "^=" => CompoundOperator::Xor,
            "<<=" => CompoundOperator::LeftShift,
            ">>=" => CompoundOperator::RightShift,
            _ => return None,
        })
    }

    pub fn token(self) -> &'static str {
        match self {
            CompoundOperator::Add => "+=",
            CompoundOperator::Subtract => "-=",
            CompoundOperator::Multiply => "*=",
            CompoundOperator::Divide => "/=",
            CompoundOperator::Modulo => "%=",
            CompoundOperator::And => "&=",
            CompoundOperator::Or => "|=",
            CompoundOperator::Xor => "^=",
            CompoundOperator::LeftShift => "<<=",
            CompoundOperator::RightShift => ">>=",
        }
    }

    /// The binary operator this compound assignment expands to.
    pub fn to_binary(self) -> BinaryOperator {
        match self {
            CompoundOperator::Add => BinaryOperator::Add,
            CompoundOperator::Subtract => BinaryOperator::Subtract,
            CompoundOperator::Multiply => BinaryOperator::Multiply,
            CompoundOperator::Divide => BinaryOperator::Divide,
            CompoundOperator::Modulo => BinaryOperator::Modulo,
            CompoundOperator::And => BinaryOperator::BitwiseAnd,
            CompoundOperator::Or => BinaryOperator::BitwiseOr,
            CompoundOperator::Xor => BinaryOperator::ExclusiveOr,
            CompoundOperator::LeftShift => BinaryOperator::LeftShift,
            CompoundOperator::RightShift => BinaryOperator::RightShift,
        }
    }
}

impl BinaryOperator {
    /// Parses a binary operator token that has a compound form.
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "&" => BinaryOperator::BitwiseAnd,
            "|" => BinaryOperator::BitwiseOr,
            "^" => BinaryOperator::ExclusiveOr,
            "<<" => BinaryOperator::LeftShift,
            ">>" => BinaryOperator::RightShift,
            _ => return None,
        })
    }

    pub fn token(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::ExclusiveOr => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
        }
    }

    /// The compound assignment this binary operator folds into.
    pub fn to_compound(self) -> CompoundOperator {
        match self {
            BinaryOperator::Add => CompoundOperator::Add,
            BinaryOperator::Subtract => CompoundOperator::Subtract,
            BinaryOperator::Multiply => CompoundOperator::Multiply,
            BinaryOperator::Divide => CompoundOperator::Divide,
            BinaryOperator::Modulo => CompoundOperator::Modulo,
            BinaryOperator::BitwiseAnd => CompoundOperator::And,
            BinaryOperator::BitwiseOr => CompoundOperator::Or,
            BinaryOperator::ExclusiveOr => CompoundOperator::Xor,
            BinaryOperator::LeftShift => CompoundOperator::LeftShift,
            BinaryOperator::RightShift => CompoundOperator::RightShift,
        }
    }
}

impl fmt::Display for CompoundOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
