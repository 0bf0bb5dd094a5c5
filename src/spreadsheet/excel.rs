//! Office Open XML package helpers
use crate::error::TimetableError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Loads the relationships of one package part
///
/// # Arguments
/// * `zip` - Zip archive handle
/// * `path` - Path to the relationships XML file within the archive
/// * `kind` - Relationship type suffix to keep (`worksheet`, `theme`, ...)
///
/// # Returns
/// Mapping of relationship IDs to part paths
pub(super) fn load_relationships(
    zip: &mut ZipArchive<UnifiedReader>,
    path: &str,
    kind: &str,
) -> Result<HashMap<String, String>, TimetableError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let suffix = format!("/{kind}");
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let relationship_type = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if relationship_type.map(|it| it.ends_with(&suffix)).unwrap_or(false) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the zip archive
///
/// # Arguments
/// * `path` - Target as written in the relationship (absolute or relative to `xl/`)
///
/// # Returns
/// Normalized path suitable for accessing files within the zip archive
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix("/xl/") {
        format!("xl/{stripped}")
    } else if path.starts_with("xl/") {
        path.to_string()
    } else if let Some(stripped) = path.strip_prefix("../") {
        stripped.to_string()
    } else {
        format!("xl/{path}")
    }
}
