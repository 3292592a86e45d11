pub mod energy_made_easy;

use std::fmt::{Display, Formatter};

/// Fuel type as encoded by the plan APIs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Fuel {
    Electricity,
    Gas,
}

impl Fuel {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Electricity => "E",
            Self::Gas => "G",
        }
    }
}

impl Display for Fuel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Electricity => write!(f, "Electricity"),
            Self::Gas => write!(f, "Gas"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum CustomerType {
    Residential,
    Business,
}

impl CustomerType {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Residential => "R",
            Self::Business => "B",
        }
    }
}

impl Display for CustomerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Residential => write!(f, "Residential"),
            Self::Business => write!(f, "Small Business"),
        }
    }
}
