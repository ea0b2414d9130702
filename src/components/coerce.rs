//! Hulpfuncties voor het converteren van `Value`-types naar projectie-invoer.

use crate::geom::{Point3, PolyMesh, Transform};
use crate::graph::value::{Matrix, Value};

use super::ComponentError;

pub fn coerce_number(value: &Value) -> Result<f64, ComponentError> {
    match value {
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse().map_err(|_| {
            ComponentError::new(format!("Kon tekst '{s}' niet naar een getal converteren"))
        }),
        Value::List(l) if l.len() == 1 => coerce_number(&l[0]),
        other => Ok(other.expect_number()?),
    }
}

pub fn coerce_text(value: &Value) -> Result<String, ComponentError> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::List(l) if l.len() == 1 => coerce_text(&l[0]),
        other => Ok(other.expect_text()?.to_owned()),
    }
}

pub fn coerce_boolean(value: &Value) -> Result<bool, ComponentError> {
    match value {
        Value::Number(n) => Ok(n.abs() > 1e-9),
        Value::List(l) if l.len() == 1 => coerce_boolean(&l[0]),
        other => Ok(other.expect_boolean()?),
    }
}

/// Zet een bron- of doelwaarde om naar een transformatie.
///
/// Geaccepteerd: een 4x4 `Matrix` (rijen, translatie in kolom 3), een `Point`
/// (alleen translatie) of een lijst van 16 getallen kolom-voor-kolom zoals
/// hosts matrices doorgeven.
pub fn coerce_transform(value: &Value) -> Result<Transform, ComponentError> {
    match value {
        Value::Point(p) => Ok(Transform::from_point(Point3::from(*p))),
        Value::List(l) if l.len() == 1 => coerce_transform(&l[0]),
        Value::List(l) if l.len() == 16 => {
            let values = l
                .iter()
                .map(coerce_number)
                .collect::<Result<Vec<_>, _>>()?;
            Transform::from_column_major(&values)
                .ok_or_else(|| ComponentError::new("Verwachtte 16 matrixwaarden"))
        }
        other => transform_from_matrix(other.expect_matrix()?),
    }
}

fn transform_from_matrix(matrix: &Matrix) -> Result<Transform, ComponentError> {
    if !matrix.is_square(4) {
        return Err(ComponentError::new(format!(
            "Verwachtte een 4x4 matrix, kreeg {}x{}",
            matrix.rows, matrix.columns
        )));
    }
    let mut m = [[0.0; 4]; 4];
    for (row, values) in m.iter_mut().enumerate() {
        for (column, slot) in values.iter_mut().enumerate() {
            *slot = matrix.get(row, column).unwrap_or_default();
        }
    }
    Ok(Transform::from_rows(m))
}

/// Bouw het botsingsoppervlak op uit de mesh-pin.
///
/// Een ontbrekende pin, `Null`, een lege lijst en een mesh zonder faces
/// leveren `None` op. Een lijst van meshes wordt samengevoegd; de
/// face-indices volgen de volgorde van de lijst.
pub fn coerce_mesh(value: Option<&Value>) -> Result<Option<PolyMesh>, ComponentError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    collect_surfaces(value, &mut vertices, &mut faces)?;

    if faces.is_empty() {
        return Ok(None);
    }
    Ok(Some(PolyMesh::new(vertices, faces)?))
}

fn collect_surfaces(
    value: &Value,
    vertices: &mut Vec<[f64; 3]>,
    faces: &mut Vec<Vec<u32>>,
) -> Result<(), ComponentError> {
    match value {
        Value::Null => Ok(()),
        Value::List(values) => values
            .iter()
            .try_for_each(|entry| collect_surfaces(entry, vertices, faces)),
        other => {
            let (surface_vertices, surface_faces) = other.expect_surface()?;
            let offset = u32::try_from(vertices.len())
                .map_err(|_| ComponentError::new("Mesh bevat te veel vertices"))?;
            vertices.extend_from_slice(surface_vertices);
            faces.extend(surface_faces.iter().map(|face| {
                face.iter().map(|index| index.saturating_add(offset)).collect()
            }));
            Ok(())
        }
    }
}
