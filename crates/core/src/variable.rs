//! Variable font queries and instancing.

use font_instancer::{AxisLimit, InstancerOptions, OverlapMode};
use fonthandle_font_ops::name_string;
use log::{debug, info};
use read_fonts::TableProvider;

use crate::{
    axes::{AxisValue, CoordinateSpec, VariableAxis, VariableInstance, all_axes_pinned, axis_name},
    distance::{Coordinates, distance},
    error::{Error, Result},
    handle::FontHandle,
    style::StyleFlags,
};

const NO_NAME_ID: u16 = 0xFFFF;

/// Options for [`FontHandle::to_static`].
#[derive(Debug, Clone, Copy)]
pub struct StaticOptions {
    /// Rename the font after the closest named instance.
    pub update_names: bool,
    /// Derive style flags from the new style name and the ital/slnt axes.
    pub update_style_flags: bool,
}

impl Default for StaticOptions {
    fn default() -> Self {
        Self {
            update_names: true,
            update_style_flags: true,
        }
    }
}

impl StaticOptions {
    pub fn with_update_names(mut self, update_names: bool) -> Self {
        self.update_names = update_names;
        self
    }

    pub fn with_update_style_flags(mut self, update_style_flags: bool) -> Self {
        self.update_style_flags = update_style_flags;
        self
    }
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl FontHandle {
    pub fn is_variable(&self) -> Result<bool> {
        Ok(self.font()?.fvar().is_ok())
    }

    pub fn is_static(&self) -> Result<bool> {
        Ok(!self.is_variable()?)
    }

    /// The fvar axes, `None` for static fonts.
    pub fn get_variable_axes(&self) -> Result<Option<Vec<VariableAxis>>> {
        let font = self.font()?;
        let Ok(fvar) = font.fvar() else {
            return Ok(None);
        };
        let axes = fvar
            .axes()?
            .iter()
            .map(|axis| {
                let tag = axis.axis_tag().to_string();
                VariableAxis {
                    name: axis_name(&tag),
                    tag,
                    min_value: axis.min_value().to_f64(),
                    default_value: axis.default_value().to_f64(),
                    max_value: axis.max_value().to_f64(),
                }
            })
            .collect();
        Ok(Some(axes))
    }

    pub fn get_variable_axis_by_tag(&self, tag: &str) -> Result<Option<VariableAxis>> {
        Ok(self
            .get_variable_axes()?
            .and_then(|axes| axes.into_iter().find(|axis| axis.tag == tag)))
    }

    pub fn get_variable_axes_tags(&self) -> Result<Option<Vec<String>>> {
        Ok(self
            .get_variable_axes()?
            .map(|axes| axes.into_iter().map(|axis| axis.tag).collect()))
    }

    /// The named instances declared in fvar, `None` for static fonts.
    pub fn get_variable_instances(&self) -> Result<Option<Vec<VariableInstance>>> {
        let Some(axes) = self.get_variable_axes()? else {
            return Ok(None);
        };
        let font = self.font()?;
        let fvar = font.fvar()?;

        let mut instances = Vec::new();
        for instance in fvar.instances()?.iter() {
            let instance = instance?;
            let coordinates = axes
                .iter()
                .zip(instance.coordinates)
                .map(|(axis, value)| (axis.tag.clone(), value.get().to_f64()))
                .collect();
            let postscript_name = instance
                .post_script_name_id
                .map(|id| id.to_u16())
                .filter(|id| *id != NO_NAME_ID)
                .and_then(|id| name_string(&font, id));
            instances.push(VariableInstance {
                coordinates,
                style_name: name_string(&font, instance.subfamily_name_id.to_u16())
                    .unwrap_or_default(),
                postscript_name,
            });
        }
        Ok(Some(instances))
    }

    /// The named instance nearest to `coordinates`.
    ///
    /// Axes missing from `coordinates` count as being at their default.
    /// When two instances are equally close the first declared wins.
    pub fn get_variable_instance_closest_to_coordinates(
        &self,
        coordinates: &Coordinates,
    ) -> Result<Option<VariableInstance>> {
        let (Some(axes), Some(instances)) =
            (self.get_variable_axes()?, self.get_variable_instances()?)
        else {
            return Ok(None);
        };

        let mut lookup: Coordinates = axes
            .iter()
            .map(|axis| (axis.tag.clone(), axis.default_value))
            .collect();
        lookup.extend(coordinates.iter().map(|(tag, value)| (tag.clone(), *value)));

        let mut closest = None;
        let mut closest_distance = f64::MAX;
        for instance in instances {
            let d = distance(&instance.coordinates, &lookup);
            if d < closest_distance {
                closest_distance = d;
                closest = Some(instance);
            }
        }
        if let Some(instance) = &closest {
            debug!(
                "closest instance to {lookup:?} is {:?} at distance {closest_distance}",
                instance.style_name
            );
        }
        Ok(closest)
    }

    fn require_variable_axes(&self) -> Result<Vec<VariableAxis>> {
        self.get_variable_axes()?
            .ok_or_else(|| Error::Operation("not a variable font".into()))
    }

    /// Pin every axis, producing a static font.
    ///
    /// Either pass `coordinates`, where missing axes stay at their default,
    /// or the `style_name` of a named instance. With `update_names` the font
    /// is renamed after the closest named instance.
    ///
    /// # Errors
    ///
    /// - `Error::Operation` if the font is static
    /// - `Error::Argument` when both `coordinates` and `style_name` are given,
    ///   the instance or an axis tag is unknown, or a value is a range
    pub fn to_static(
        &mut self,
        coordinates: Option<&CoordinateSpec>,
        style_name: Option<&str>,
        options: StaticOptions,
    ) -> Result<()> {
        let axes = self.require_variable_axes()?;

        let mut spec = match (coordinates, style_name) {
            (Some(_), Some(_)) => {
                return Err(Error::Argument(
                    "pass either coordinates or a style name, not both".into(),
                ));
            }
            (None, Some(style_name)) => {
                let wanted = slug(style_name);
                let instance = self
                    .get_variable_instances()?
                    .unwrap_or_default()
                    .into_iter()
                    .find(|instance| slug(&instance.style_name) == wanted)
                    .ok_or_else(|| {
                        Error::Argument(format!("no named instance called {style_name:?}"))
                    })?;
                instance
                    .coordinates
                    .into_iter()
                    .map(|(tag, value)| (tag, AxisValue::Pin(value)))
                    .collect()
            }
            (Some(coordinates), None) => coordinates.clone(),
            (None, None) => CoordinateSpec::new(),
        };

        check_axis_tags(&axes, &spec)?;
        for axis in &axes {
            spec.entry(axis.tag.clone()).or_insert(AxisValue::Default);
        }
        if !all_axes_pinned(&spec) {
            return Err(Error::Argument(
                "all axes must be pinned to create a static instance".into(),
            ));
        }

        let resolved: Coordinates = axes
            .iter()
            .map(|axis| {
                let value = match spec.get(&axis.tag) {
                    Some(AxisValue::Pin(value)) => *value,
                    _ => axis.default_value,
                };
                (axis.tag.clone(), value)
            })
            .collect();
        debug!("resolved static coordinates {resolved:?}");
        let closest = self.get_variable_instance_closest_to_coordinates(&resolved)?;

        let instancer_options = InstancerOptions::new()
            .with_optimize(true)
            .with_overlap(OverlapMode::Remove);
        self.instantiate(&axes, &spec, &instancer_options)?;
        info!("instantiated static font at {resolved:?}");

        if options.update_names
            && let Some(instance) = closest
        {
            self.rename(None, Some(&instance.style_name), options.update_style_flags)?;
        }

        if options.update_style_flags {
            let italic = resolved.get("ital").is_some_and(|value| *value == 1.0);
            let slanted = resolved.get("slnt").is_some_and(|value| *value < 0.0);
            if italic || slanted {
                self.set_style_flags(StyleFlags {
                    regular: Some(false),
                    italic: Some(true),
                    ..StyleFlags::default()
                })?;
            }
        }
        Ok(())
    }

    /// Pin or narrow some axes, keeping the font variable.
    ///
    /// Axes missing from `coordinates` are left untouched.
    ///
    /// # Errors
    ///
    /// - `Error::Operation` if the font is static
    /// - `Error::Argument` for an empty spec, unknown axis tags, or a spec
    ///   pinning every axis (use [`FontHandle::to_static`])
    pub fn to_sliced_variable(
        &mut self,
        coordinates: &CoordinateSpec,
        options: &InstancerOptions,
    ) -> Result<()> {
        let axes = self.require_variable_axes()?;
        if coordinates.is_empty() {
            return Err(Error::Argument("axes not defined".into()));
        }
        check_axis_tags(&axes, coordinates)?;

        let covers_all_axes = axes.iter().all(|axis| coordinates.contains_key(&axis.tag));
        if covers_all_axes && all_axes_pinned(coordinates) {
            return Err(Error::Argument(
                "all axes are pinned, use to_static".into(),
            ));
        }

        self.instantiate(&axes, coordinates, options)?;
        info!("sliced variable font to {coordinates:?}");
        Ok(())
    }

    /// Run the instancer. Tags in `spec` are already checked against `axes`.
    fn instantiate(
        &mut self,
        axes: &[VariableAxis],
        spec: &CoordinateSpec,
        options: &InstancerOptions,
    ) -> Result<()> {
        let limits: Vec<AxisLimit> = spec
            .iter()
            .filter_map(|(tag, value)| {
                let axis = axes.iter().find(|axis| axis.tag == *tag)?;
                Some(value.to_limit(axis))
            })
            .collect();
        let data = self.instancer().instantiate(self.data()?, &limits, options)?;
        self.replace_data(data)
    }
}

fn check_axis_tags(axes: &[VariableAxis], spec: &CoordinateSpec) -> Result<()> {
    match spec
        .keys()
        .find(|tag| !axes.iter().any(|axis| axis.tag == **tag))
    {
        Some(tag) => Err(Error::Argument(format!("invalid axis tag {tag:?}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slug(" Bold Italic "), "bold-italic");
        assert_eq!(slug("ExtraLight"), "extralight");
        assert_eq!(slug("Bold  Italic"), "bold-italic");
        assert_eq!(slug("Bold\tItalic\n"), "bold-italic");
    }

    #[test]
    fn static_options_default_to_updating() {
        let options = StaticOptions::default();
        assert!(options.update_names && options.update_style_flags);
        assert!(!options.with_update_names(false).update_names);
    }

    #[test]
    fn static_fonts_have_no_axes() {
        let font = FontHandle::from_bytes(font_test_data::SIMPLE_GLYF).unwrap();
        assert!(font.is_static().unwrap());
        assert_eq!(font.get_variable_axes().unwrap(), None);
        assert_eq!(font.get_variable_instances().unwrap(), None);
        assert_eq!(
            font.get_variable_instance_closest_to_coordinates(&Coordinates::new()).unwrap(),
            None
        );
    }

    #[test]
    fn instancing_static_font_fails() {
        let mut font = FontHandle::from_bytes(font_test_data::SIMPLE_GLYF).unwrap();
        let err = font.to_static(None, None, StaticOptions::default()).unwrap_err();
        assert!(err.is_operation());
        let spec = crate::coordinates([("wght", 400.0)]);
        let err = font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap_err();
        assert!(err.is_operation());
    }

    #[test]
    fn reads_real_axes() {
        let font = FontHandle::from_bytes(font_test_data::VAZIRMATN_VAR).unwrap();
        let axes = font.get_variable_axes().unwrap().unwrap();
        assert_eq!(axes[0].tag, "wght");
        assert_eq!(axes[0].name, "Weight");
        assert!(axes[0].min_value <= axes[0].default_value);
        assert!(axes[0].default_value <= axes[0].max_value);
    }
}
