//! Row formatting
//!
//! Plates render as `TEXT COUNTRY STATE CATEGORY 97% (text: 95%|state: 88%)`,
//! vehicles as `MAKE MODEL (GENERATION CATEGORY BODY VIEW)`. Repeated values
//! inside one column are joined with `|`.

use crate::grouping::{Role, RolePatterns};
use crate::proto::{EventResult, Mmr, Plate};
use crate::scan::ImageFile;

pub const CSV_HEADER: &str = "Front Image,Rear Image,Overview Image,Node,Front Plate,Front Plate Alternative,Rear Plate,Rear Plate Alternative,MMR,MMR Alternative";

/// Separator for multiple values inside one column
pub const VALUE_SEPARATOR: &str = "|";

pub fn format_plate(plate: &Plate) -> String {
    format!(
        "{} {} {} {} {}% (text: {}%|state: {}%)",
        plate.text,
        plate.country,
        plate.state,
        plate.category,
        plate.confidence,
        plate.text_confidence,
        plate.plate_type_confidence
    )
}

pub fn format_mmr(mmr: &Mmr) -> String {
    format!(
        "{} {} ({} {} {} {})",
        mmr.make, mmr.model, mmr.generation, mmr.category, mmr.body_type, mmr.view_point
    )
}

fn join_formatted<T>(items: &[T], render: fn(&T) -> String) -> String {
    items
        .iter()
        .map(render)
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR)
}

/// One CSV line of the output file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub front_images: String,
    pub rear_images: String,
    pub overview_images: String,
    pub node: String,
    pub front_plate: String,
    pub front_plate_alternative: String,
    pub rear_plate: String,
    pub rear_plate_alternative: String,
    pub mmr: String,
    pub mmr_alternative: String,
}

impl OutputRow {
    /// Build the row for a group's event result. Image columns are
    /// recomputed from the group's files with the role patterns.
    pub fn from_result(files: &[ImageFile], patterns: &RolePatterns, result: &EventResult) -> Self {
        let split = patterns.split(files);

        Self {
            front_images: split.joined_names(Role::Front, VALUE_SEPARATOR),
            rear_images: split.joined_names(Role::Rear, VALUE_SEPARATOR),
            overview_images: split.joined_names(Role::Overview, VALUE_SEPARATOR),
            node: result.node.clone(),
            front_plate: result.front_plate.as_ref().map(format_plate).unwrap_or_default(),
            front_plate_alternative: join_formatted(&result.front_plate_alternative, format_plate),
            rear_plate: result.rear_plate.as_ref().map(format_plate).unwrap_or_default(),
            rear_plate_alternative: join_formatted(&result.rear_plate_alternative, format_plate),
            mmr: result.mmr.as_ref().map(format_mmr).unwrap_or_default(),
            mmr_alternative: join_formatted(&result.mmr_alternative, format_mmr),
        }
    }

    fn columns(&self) -> [&str; 10] {
        [
            &self.front_images,
            &self.rear_images,
            &self.overview_images,
            &self.node,
            &self.front_plate,
            &self.front_plate_alternative,
            &self.rear_plate,
            &self.rear_plate_alternative,
            &self.mmr,
            &self.mmr_alternative,
        ]
    }

    /// Comma-joined columns, without line terminator
    pub fn to_csv_line(&self) -> String {
        self.columns().join(",")
    }
}
