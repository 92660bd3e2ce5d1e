//! Free-standing text annotations. Purely cosmetic.

use core::str::FromStr;

use ncl_core::{ElementId, NclError, Point};

/// Alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    /// Left or top.
    Start,
    #[default]
    Center,
    /// Right or bottom.
    End,
}

impl FromStr for Align {
    type Err = NclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" | "top" => Ok(Align::Start),
            "center" => Ok(Align::Center),
            "right" | "bottom" => Ok(Align::End),
            other => Err(NclError::format(format!("unknown alignment '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub(crate) id: ElementId,
    pub(crate) position: Point,
    pub(crate) text: String,
    pub(crate) halign: Align,
    pub(crate) valign: Align,
}

impl Label {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn halign(&self) -> Align {
        self.halign
    }

    pub fn valign(&self) -> Align {
        self.valign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_alignment() {
        assert_eq!("left".parse::<Align>().unwrap(), Align::Start);
        assert_eq!("bottom".parse::<Align>().unwrap(), Align::End);
        assert_eq!("center".parse::<Align>().unwrap(), Align::Center);
        assert!("middle".parse::<Align>().is_err());
    }
}
