use super::store::{LayoutStore, LocalLayouts};
use super::templates::TemplateCatalog;
use crate::error::LayoutError;
use crate::model::LayoutDocument;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A file ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

pub fn layout_file_name(layout_id: &str, date: NaiveDate) -> String {
    format!("{layout_id}_sld_layout_{}.json", date.format("%Y-%m-%d"))
}

pub fn bulk_file_name(date: NaiveDate) -> String {
    format!("all_sld_layouts_{}.json", date.format("%Y-%m-%d"))
}

pub fn export_layout(doc: &LayoutDocument, date: NaiveDate) -> Result<ExportFile, LayoutError> {
    let doc = doc.without_placeholder();
    let contents =
        serde_json::to_string_pretty(&doc).map_err(|err| LayoutError::SerializeError {
            layout_id: doc.layout_id.clone(),
            message: err.to_string(),
        })?;
    Ok(ExportFile {
        file_name: layout_file_name(&doc.layout_id, date),
        contents,
    })
}

/// Every locally stored layout, plus each template the store does not override.
pub fn export_all<S: LayoutStore>(
    local: &mut LocalLayouts<S>,
    templates: &TemplateCatalog,
    date: NaiveDate,
) -> Result<ExportFile, LayoutError> {
    let mut layouts: BTreeMap<String, LayoutDocument> = local.all();
    for template in templates.iter() {
        layouts
            .entry(template.layout_id.clone())
            .or_insert_with(|| template.clone());
    }
    let contents =
        serde_json::to_string_pretty(&layouts).map_err(|err| LayoutError::SerializeError {
            layout_id: "*".to_string(),
            message: err.to_string(),
        })?;
    Ok(ExportFile {
        file_name: bulk_file_name(date),
        contents,
    })
}
