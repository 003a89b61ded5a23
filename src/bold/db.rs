use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The remote reference databases offered by the identification service.
/// Closed set: the service exposes exactly these through its search panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Database {
    #[value(name = "COX1")]
    Cox1,
    #[value(name = "COX1_SPECIES")]
    Cox1Species,
    #[value(name = "COX1_SPECIES_PUBLIC")]
    Cox1SpeciesPublic,
    #[value(name = "COX1_L640bp")]
    Cox1L640bp,
    #[value(name = "ITS")]
    Its,
    #[value(name = "MATK_RBCL")]
    MatkRbcl,
}

/// The service groups databases into three search panels, each with its own
/// submission endpoint and results-table styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaneType {
    Animal,
    Fungi,
    Plant,
}

pub const BASE_URL: &str = "http://www.boldsystems.org";

impl Database {
    /// Name as the `searchdb` form field expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Database::Cox1 => "COX1",
            Database::Cox1Species => "COX1_SPECIES",
            Database::Cox1SpeciesPublic => "COX1_SPECIES_PUBLIC",
            Database::Cox1L640bp => "COX1_L640bp",
            Database::Its => "ITS",
            Database::MatkRbcl => "MATK_RBCL",
        }
    }

    pub fn pane_type(&self) -> PaneType {
        match self {
            Database::Cox1
            | Database::Cox1Species
            | Database::Cox1SpeciesPublic
            | Database::Cox1L640bp => PaneType::Animal,
            Database::Its => PaneType::Fungi,
            Database::MatkRbcl => PaneType::Plant,
        }
    }
}

impl std::str::FromStr for Database {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COX1" => Ok(Database::Cox1),
            "COX1_SPECIES" => Ok(Database::Cox1Species),
            "COX1_SPECIES_PUBLIC" => Ok(Database::Cox1SpeciesPublic),
            "COX1_L640bp" => Ok(Database::Cox1L640bp),
            "ITS" => Ok(Database::Its),
            "MATK_RBCL" => Ok(Database::MatkRbcl),
            _ => Err(format!("Unknown database: {}", s)),
        }
    }
}

impl std::fmt::Display for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaneType {
    /// Value of the `tabtype` form field.
    pub fn tab_tag(&self) -> &'static str {
        match self {
            PaneType::Animal => "animalTabPane",
            PaneType::Fungi => "fungiTabPane",
            PaneType::Plant => "plantTabPane",
        }
    }

    /// Submission endpoint path. The animal panel has a dedicated
    /// identification endpoint; fungi and plants share a blast-style one.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            PaneType::Animal => "/index.php/IDS_IdentificationRequest",
            PaneType::Fungi | PaneType::Plant => "/index.php/IDS_BlastRequest",
        }
    }

    /// CSS selector for the results table on this panel's report page.
    /// All knowledge of the page layout lives here and in `parse.rs`; a
    /// service-side redesign means updating these mappings only.
    pub fn table_selector(&self) -> &'static str {
        match self {
            PaneType::Animal => "table.resultsTable.noborder",
            PaneType::Fungi | PaneType::Plant => "table.table.resultTable.noborder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_pane_mapping() {
        assert_eq!(Database::Cox1.pane_type(), PaneType::Animal);
        assert_eq!(Database::Cox1Species.pane_type(), PaneType::Animal);
        assert_eq!(Database::Cox1SpeciesPublic.pane_type(), PaneType::Animal);
        assert_eq!(Database::Cox1L640bp.pane_type(), PaneType::Animal);
        assert_eq!(Database::Its.pane_type(), PaneType::Fungi);
        assert_eq!(Database::MatkRbcl.pane_type(), PaneType::Plant);
    }

    #[test]
    fn test_pane_endpoints() {
        assert_eq!(
            PaneType::Animal.endpoint_path(),
            "/index.php/IDS_IdentificationRequest"
        );
        assert_eq!(
            PaneType::Fungi.endpoint_path(),
            "/index.php/IDS_BlastRequest"
        );
        assert_eq!(
            PaneType::Plant.endpoint_path(),
            "/index.php/IDS_BlastRequest"
        );
    }

    #[test]
    fn test_from_str_round_trip() {
        for name in [
            "COX1",
            "COX1_SPECIES",
            "COX1_SPECIES_PUBLIC",
            "COX1_L640bp",
            "ITS",
            "MATK_RBCL",
        ] {
            let db: Database = name.parse().unwrap();
            assert_eq!(db.to_string(), name);
        }
        assert!("COX2".parse::<Database>().is_err());
    }
}
