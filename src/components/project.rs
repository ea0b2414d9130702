//! Projectiecomponenten: verplaats een object van bron naar doel en klik het
//! vast op het eerste oppervlak dat het pad kruist.

use crate::geom::{
    HitOrder, NO_HIT_ALIGNMENT, NO_HIT_ORIENTATION, ProjectionMode, ProjectionOptions, RaySurface,
    project_with_options,
};
use crate::graph::node::{MetaLookupExt, MetaMap, MetaValue};
use crate::graph::value::{Value, ValueKind};

use super::coerce::{coerce_mesh, coerce_number, coerce_transform};
use super::{Component, ComponentError, ComponentResult, OutputMap};

pub const PIN_INPUT_SOURCE: &str = "S";
pub const PIN_INPUT_TARGET: &str = "T";
pub const PIN_INPUT_BLEND: &str = "V";
pub const PIN_INPUT_MESH: &str = "M";

pub const PIN_OUTPUT_POSITION: &str = "P";
pub const PIN_OUTPUT_ROTATION: &str = "R";
pub const PIN_OUTPUT_ALIGNMENT: &str = "A";
pub const PIN_OUTPUT_DELTA: &str = "D";

const META_MODE: &str = "mode";
const META_HIT_ORDER: &str = "hitorder";
const META_TOLERANCE: &str = "tolerance";
const META_BOTH_DIRECTIONS: &str = "bothdirections";

/// Beschikbare projectiecomponenten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Alleen een positie, voorwaarts zoeken.
    ProjectPosition,
    /// Positie, oriëntatie en uitlijning.
    ProjectOriented,
}

/// Metadata voor de registratie van een component.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Registraties van de projectiecomponenten.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["0007ffff"],
        names: &["Project", "Proj", "projectNode"],
        kind: ComponentKind::ProjectOriented,
    },
    Registration {
        guids: &[],
        names: &["Project Position", "ProjPos"],
        kind: ComponentKind::ProjectPosition,
    },
];

/// Beschrijving van één pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSpec {
    pub name: &'static str,
    pub nickname: &'static str,
    pub kind: ValueKind,
    pub optional: bool,
}

/// Statisch schema van de projectienode: pinnen en welke inputs welke
/// outputs beïnvloeden.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSchema {
    pub inputs: &'static [PinSpec],
    pub outputs: &'static [PinSpec],
    /// Per output de inputs waarvan hij afhangt.
    pub dependencies: &'static [(&'static str, &'static [&'static str])],
}

pub const SCHEMA: ProjectSchema = ProjectSchema {
    inputs: &[
        PinSpec {
            name: "Source",
            nickname: PIN_INPUT_SOURCE,
            kind: ValueKind::Matrix,
            optional: false,
        },
        PinSpec {
            name: "Target",
            nickname: PIN_INPUT_TARGET,
            kind: ValueKind::Matrix,
            optional: false,
        },
        PinSpec {
            name: "Value",
            nickname: PIN_INPUT_BLEND,
            kind: ValueKind::Number,
            optional: false,
        },
        PinSpec {
            name: "Mesh",
            nickname: PIN_INPUT_MESH,
            kind: ValueKind::Surface,
            optional: true,
        },
    ],
    outputs: &[
        PinSpec {
            name: "Position",
            nickname: PIN_OUTPUT_POSITION,
            kind: ValueKind::Point,
            optional: false,
        },
        PinSpec {
            name: "Rotation",
            nickname: PIN_OUTPUT_ROTATION,
            kind: ValueKind::Vector,
            optional: true,
        },
        PinSpec {
            name: "Alignment",
            nickname: PIN_OUTPUT_ALIGNMENT,
            kind: ValueKind::Number,
            optional: true,
        },
        PinSpec {
            name: "Delta",
            nickname: PIN_OUTPUT_DELTA,
            kind: ValueKind::Vector,
            optional: false,
        },
    ],
    dependencies: &[
        (
            PIN_OUTPUT_POSITION,
            &[PIN_INPUT_SOURCE, PIN_INPUT_TARGET, PIN_INPUT_BLEND, PIN_INPUT_MESH],
        ),
        (
            PIN_OUTPUT_ROTATION,
            &[PIN_INPUT_SOURCE, PIN_INPUT_TARGET, PIN_INPUT_MESH],
        ),
        (
            PIN_OUTPUT_ALIGNMENT,
            &[PIN_INPUT_SOURCE, PIN_INPUT_TARGET, PIN_INPUT_MESH],
        ),
        (
            PIN_OUTPUT_DELTA,
            &[PIN_INPUT_SOURCE, PIN_INPUT_TARGET, PIN_INPUT_MESH],
        ),
    ],
};

impl ProjectSchema {
    #[must_use]
    pub fn input(&self, nickname: &str) -> Option<&PinSpec> {
        self.inputs.iter().find(|pin| pin.nickname == nickname)
    }

    #[must_use]
    pub fn output(&self, nickname: &str) -> Option<&PinSpec> {
        self.outputs.iter().find(|pin| pin.nickname == nickname)
    }

    /// Inputs waarvan `output` afhangt; leeg voor onbekende outputs.
    #[must_use]
    pub fn dependencies_of(&self, output: &str) -> &'static [&'static str] {
        self.dependencies
            .iter()
            .find(|(name, _)| *name == output)
            .map(|(_, inputs)| *inputs)
            .unwrap_or(&[])
    }

    /// Outputs die opnieuw berekend moeten worden als `input` wijzigt.
    #[must_use]
    pub fn affected_outputs(&self, input: &str) -> Vec<&'static str> {
        self.dependencies
            .iter()
            .filter(|(_, inputs)| inputs.contains(&input))
            .map(|(output, _)| *output)
            .collect()
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ProjectPosition => "Project Position",
            Self::ProjectOriented => "Project",
        }
    }

    #[must_use]
    pub fn mode(self) -> ProjectionMode {
        match self {
            Self::ProjectPosition => ProjectionMode::PositionOnly,
            Self::ProjectOriented => ProjectionMode::Oriented,
        }
    }

    /// Outputpinnen die dit component vult met de gegeven meta. Een
    /// `mode` in de meta gaat voor de modus van het component.
    pub fn output_pins(self, meta: &MetaMap) -> Result<&'static [&'static str], ComponentError> {
        options_from_meta(self, meta).map(|options| output_pins_for(options.mode))
    }
}

fn output_pins_for(mode: ProjectionMode) -> &'static [&'static str] {
    match mode {
        ProjectionMode::PositionOnly => &[PIN_OUTPUT_POSITION, PIN_OUTPUT_DELTA],
        ProjectionMode::Oriented => &[
            PIN_OUTPUT_POSITION,
            PIN_OUTPUT_ROTATION,
            PIN_OUTPUT_ALIGNMENT,
            PIN_OUTPUT_DELTA,
        ],
    }
}

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        if inputs.len() < 3 {
            return Err(ComponentError::new(format!(
                "{} vereist een bron, een doel en een waarde",
                self.name()
            )));
        }

        let source = coerce_transform(&inputs[0])?;
        let target = coerce_transform(&inputs[1])?;
        let blend = coerce_number(&inputs[2])?;
        let mesh = coerce_mesh(inputs.get(3))?;
        let options = options_from_meta(*self, meta)?;

        let surface = mesh.as_ref().map(|mesh| mesh as &dyn RaySurface);
        let result = project_with_options(source, target, blend, surface, &options);

        let mut outputs = OutputMap::new();
        for &pin in output_pins_for(options.mode) {
            let value = match pin {
                PIN_OUTPUT_POSITION => Value::Point(result.position.to_array()),
                PIN_OUTPUT_ROTATION => Value::Vector(
                    result
                        .orientation
                        .unwrap_or(NO_HIT_ORIENTATION)
                        .to_array(),
                ),
                PIN_OUTPUT_ALIGNMENT => {
                    Value::Number(result.alignment.unwrap_or(NO_HIT_ALIGNMENT))
                }
                _ => Value::Vector(result.delta.to_array()),
            };
            outputs.insert(pin.to_owned(), value);
        }
        Ok(outputs)
    }
}

/// Lees de projectie-opties uit de node-meta. De modus volgt uit het
/// component tenzij `mode` expliciet gezet is.
pub fn options_from_meta(
    kind: ComponentKind,
    meta: &MetaMap,
) -> Result<ProjectionOptions, ComponentError> {
    let mut options = ProjectionOptions {
        mode: kind.mode(),
        ..ProjectionOptions::default()
    };

    if let Some(value) = meta.get_normalized(META_MODE) {
        let name = meta_text(META_MODE, value)?;
        options.mode = ProjectionMode::from_name(name)
            .ok_or_else(|| ComponentError::new(format!("Onbekende projectiemodus '{name}'")))?;
    }

    if let Some(value) = meta.get_normalized(META_HIT_ORDER) {
        let name = meta_text(META_HIT_ORDER, value)?;
        options.hit_order = HitOrder::from_name(name)
            .ok_or_else(|| ComponentError::new(format!("Onbekende hitvolgorde '{name}'")))?;
    }

    if let Some(value) = meta.get_normalized(META_TOLERANCE) {
        let tolerance = value.as_number().ok_or_else(|| {
            ComponentError::new(format!("Meta '{META_TOLERANCE}' moet een getal zijn"))
        })?;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ComponentError::new(format!(
                "Tolerantie moet positief zijn, kreeg {tolerance}"
            )));
        }
        options.tolerance = tolerance;
    }

    if let Some(value) = meta.get_normalized(META_BOTH_DIRECTIONS) {
        let both = value.as_boolean().ok_or_else(|| {
            ComponentError::new(format!(
                "Meta '{META_BOTH_DIRECTIONS}' moet een booleaanse waarde zijn"
            ))
        })?;
        options.test_both_directions = Some(both);
    }

    Ok(options)
}

fn meta_text<'a>(key: &str, value: &'a MetaValue) -> Result<&'a str, ComponentError> {
    value
        .as_text()
        .ok_or_else(|| ComponentError::new(format!("Meta '{key}' moet tekst zijn")))
}
