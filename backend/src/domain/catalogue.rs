//! Fixed option lists offered by the registration form.

use std::fmt;

use serde::Serialize;

/// Gender choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// All choices in display order.
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Display label, also the accepted form value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }

    /// Parse a form value, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|gender| gender.label().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A physician patients may pick as their primary physician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Physician {
    /// Full name, also the accepted form value.
    pub name: &'static str,
    /// Avatar served by the frontend.
    pub image: &'static str,
}

/// Physicians available for selection.
pub const PHYSICIANS: [Physician; 9] = [
    Physician {
        name: "John Green",
        image: "/assets/images/dr-green.png",
    },
    Physician {
        name: "Leila Cameron",
        image: "/assets/images/dr-cameron.png",
    },
    Physician {
        name: "David Livingston",
        image: "/assets/images/dr-livingston.png",
    },
    Physician {
        name: "Evan Peter",
        image: "/assets/images/dr-peter.png",
    },
    Physician {
        name: "Jane Powell",
        image: "/assets/images/dr-powell.png",
    },
    Physician {
        name: "Alex Ramirez",
        image: "/assets/images/dr-remirez.png",
    },
    Physician {
        name: "Jasmine Lee",
        image: "/assets/images/dr-lee.png",
    },
    Physician {
        name: "Alyana Cruz",
        image: "/assets/images/dr-cruz.png",
    },
    Physician {
        name: "Hardik Sharma",
        image: "/assets/images/dr-sharma.png",
    },
];

/// Look up a physician by exact name (surrounding whitespace ignored).
pub fn find_physician(name: &str) -> Option<&'static Physician> {
    let name = name.trim();
    PHYSICIANS.iter().find(|physician| physician.name == name)
}

/// Identification documents accepted at registration.
pub const IDENTIFICATION_TYPES: [&str; 11] = [
    "Birth Certificate",
    "Driver's License",
    "Medical Insurance Card/Policy",
    "Military ID Card",
    "National Identity Card",
    "Passport",
    "Resident Alien Card (Green Card)",
    "Social Security Card",
    "State ID Card",
    "Student ID Card",
    "Voter ID Card",
];

/// Canonical spelling of an identification type, if recognised.
pub fn find_identification_type(value: &str) -> Option<&'static str> {
    let value = value.trim();
    IDENTIFICATION_TYPES
        .into_iter()
        .find(|kind| kind.eq_ignore_ascii_case(value))
}

/// All option lists, as served to the form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeOptions {
    /// Gender labels.
    pub genders: Vec<&'static str>,
    /// Selectable physicians.
    pub physicians: Vec<Physician>,
    /// Identification document types.
    pub identification_types: Vec<&'static str>,
}

impl IntakeOptions {
    /// Snapshot of the built-in catalogues.
    pub fn current() -> Self {
        Self {
            genders: Gender::ALL.into_iter().map(Gender::label).collect(),
            physicians: PHYSICIANS.to_vec(),
            identification_types: IDENTIFICATION_TYPES.to_vec(),
        }
    }
}
