use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Adelie,
    Chinstrap,
    Gentoo,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Adelie, Species::Chinstrap, Species::Gentoo];

    /// Species owning a record key. Keys are spread round-robin so a store
    /// partitioned by species can address any record from its key alone.
    pub fn for_key(key: u32) -> Species {
        Self::ALL[key as usize % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Adelie => "Adelie",
            Species::Chinstrap => "Chinstrap",
            Species::Gentoo => "Gentoo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Island {
    Biscoe,
    Dream,
    Torgersen,
}

impl Island {
    pub const ALL: [Island; 3] = [Island::Biscoe, Island::Dream, Island::Torgersen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Island::Biscoe => "Biscoe",
            Island::Dream => "Dream",
            Island::Torgersen => "Torgersen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "MALE",
            Sex::Female => "FEMALE",
        }
    }
}

/// One observation in the penguins dataset. Field names on the wire match the
/// provisioned document layout. Integer fields stay within int32, the type the
/// document store validates them as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penguin {
    #[serde(rename = "sampleNumber")]
    pub sample_number: u32,
    #[serde(rename = "studyName")]
    pub study_name: String,
    pub species: Species,
    pub island: Island,
    #[serde(rename = "culmenLength")]
    pub culmen_length_mm: f64,
    #[serde(rename = "culmenDepth")]
    pub culmen_depth_mm: f64,
    #[serde(rename = "flipperLength")]
    pub flipper_length_mm: u32,
    #[serde(rename = "bodyMass")]
    pub body_mass_g: u32,
    pub sex: Sex,
}

/// Partial update applied by an update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenguinPatch {
    pub flipper_length_mm: u32,
    pub body_mass_g: u32,
}

/// Filter evaluated by a filter query: one species, optionally narrowed to an
/// inclusive body mass range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub species: Species,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_mass_g: Option<(u32, u32)>,
}

impl Predicate {
    pub fn matches(&self, penguin: &Penguin) -> bool {
        if penguin.species != self.species {
            return false;
        }
        match self.body_mass_g {
            Some((min, max)) => (min..=max).contains(&penguin.body_mass_g),
            None => true,
        }
    }
}
