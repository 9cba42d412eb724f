//! JSON shape-file loading (`--json`, `spec.md` §6), grounded in
//! `original_source/TravSHACL/core/ShapeParser.py`'s JSON branch. Directory
//! loading is parallelized with `rayon`, the way the teacher's CLI
//! parallelizes loading multiple RDF data files.

use std::path::Path;

use rayon::prelude::*;
use serde::Deserialize;

use crate::err::{Result, ShaclError};

use super::input::ShapeSchemaInput;

/// A shape file may hold one shape object or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonShapeFile {
    One(ShapeSchemaInput),
    Many(Vec<ShapeSchemaInput>),
}

pub fn load_directory(dir: &Path) -> Result<Vec<ShapeSchemaInput>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ShaclError::Schema(format!("shape directory '{}' not found: {}", dir.display(), e)))?;

    let paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();

    let parsed: Vec<Vec<ShapeSchemaInput>> = paths.par_iter().map(|path| load_file(path)).collect::<Result<_>>()?;

    Ok(parsed.into_iter().flatten().collect())
}

fn load_file(path: &Path) -> Result<Vec<ShapeSchemaInput>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ShaclError::Io(format!("failed to read '{}': {}", path.display(), e)))?;
    let file: JsonShapeFile = serde_json::from_str(&content)
        .map_err(|e| ShaclError::Parse(format!("invalid shape JSON in '{}': {}", path.display(), e)))?;
    Ok(match file {
        JsonShapeFile::One(shape) => vec![shape],
        JsonShapeFile::Many(shapes) => shapes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_shape_object() {
        let file: JsonShapeFile = serde_json::from_str(
            r#"{"id": "A", "target_type": "class", "target_def": "?x a :A ."}"#,
        )
        .unwrap();
        match file {
            JsonShapeFile::One(shape) => assert_eq!(shape.id, "A"),
            JsonShapeFile::Many(_) => panic!("expected a single shape"),
        }
    }

    #[test]
    fn parses_an_array_of_shapes() {
        let file: JsonShapeFile = serde_json::from_str(r#"[{"id": "A"}, {"id": "B"}]"#).unwrap();
        match file {
            JsonShapeFile::Many(shapes) => assert_eq!(shapes.len(), 2),
            JsonShapeFile::One(_) => panic!("expected an array"),
        }
    }
}
