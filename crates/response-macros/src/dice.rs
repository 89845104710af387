//! Dice notation parsing and rolling (`2d6`, `d20`, `3D8`).

use rand::Rng;
use std::num::IntErrorKind;
use thiserror::Error;

/// A die description that can't be rolled.
///
/// Every variant names the offending die token, not the whole expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDie {
    #[error("I didn't understand the die description \"{die}\"")]
    Unparseable { die: String },

    #[error("I can't roll {quantity} dice (\"{die}\")")]
    Quantity { die: String, quantity: String },

    #[error("I don't have a die with {sides} sides (\"{die}\")")]
    Sides { die: String, sides: String },
}

impl InvalidDie {
    /// The die token that failed.
    pub fn die(&self) -> &str {
        match self {
            Self::Unparseable { die } | Self::Quantity { die, .. } | Self::Sides { die, .. } => die,
        }
    }
}

/// A validated die description. Only obtainable through [`DieSpec::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieSpec {
    quantity: u32,
    sides: u32,
}

impl DieSpec {
    pub const MAX_QUANTITY: u32 = 20;
    pub const MAX_SIDES: u32 = 1000;

    /// Parse a single die token such as `2d6` or `d20`.
    pub fn parse(die: &str) -> Result<Self, InvalidDie> {
        let unparseable = || InvalidDie::Unparseable { die: die.to_string() };

        let lowered = die.to_lowercase();
        let (quantity, sides) = lowered.split_once('d').ok_or_else(unparseable)?;
        let quantity = if quantity.is_empty() { "1" } else { quantity };

        let Some(quantity) = bounded(quantity, Self::MAX_QUANTITY).ok_or_else(unparseable)? else {
            return Err(InvalidDie::Quantity {
                die: die.to_string(),
                quantity: quantity.to_string(),
            });
        };
        let Some(sides) = bounded(sides, Self::MAX_SIDES).ok_or_else(unparseable)? else {
            return Err(InvalidDie::Sides {
                die: die.to_string(),
                sides: sides.to_string(),
            });
        };

        Ok(Self { quantity, sides })
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    fn roll_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Vec<u32>) {
        out.extend((0..self.quantity).map(|_| rng.gen_range(1..=self.sides)));
    }
}

/// Parse a count and check it lies in `1..=max`.
///
/// `None` means the text isn't a number at all, `Some(None)` means it is one
/// (possibly too large for any integer type) but out of range.
fn bounded(text: &str, max: u32) -> Option<Option<u32>> {
    match text.parse::<i64>() {
        Ok(n) => Some(u32::try_from(n).ok().filter(|n| (1..=max).contains(n))),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Some(None),
            _ => None,
        },
    }
}

/// Roll every die token in order using the thread-local RNG.
pub fn roll<S: AsRef<str>>(dice: &[S]) -> Result<Vec<u32>, InvalidDie> {
    roll_with(&mut rand::thread_rng(), dice)
}

/// Roll every die token in order using the given RNG.
///
/// All tokens are validated before anything is rolled, so a malformed token
/// anywhere in the expression yields no partial result.
pub fn roll_with<R, S>(rng: &mut R, dice: &[S]) -> Result<Vec<u32>, InvalidDie>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let specs = dice
        .iter()
        .map(|d| DieSpec::parse(d.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rolls = Vec::new();
    for spec in &specs {
        spec.roll_into(rng, &mut rolls);
    }
    Ok(rolls)
}

/// Render rolls as `4` for a single die or `3 + 5 = 8` otherwise.
pub fn render_rolls(rolls: &[u32]) -> String {
    match rolls {
        [single] => single.to_string(),
        _ => {
            let total: u64 = rolls.iter().map(|&r| u64::from(r)).sum();
            let terms: Vec<String> = rolls.iter().map(u32::to_string).collect();
            format!("{} = {}", terms.join(" + "), total)
        }
    }
}
