// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Serializes an export scene into LDraw lines
//!
//! Output order: header lines from the active object, a blank line, type 1
//! references for objects that are not exported as polygons, a blank line,
//! then every polygon and edge line sorted by (color, line type) and grouped
//! under `0 // <color name>` comments.
//!
//! Blank separators are empty strings; the writer terminates every line with
//! `\n`.

use super::format::format_decimal;
use super::scene::{ExportScene, LDrawProps};
use crate::config::{ExportOptions, NgonHandling};
use crate::error::ExportError;
use crate::geometry::{EdgeClassifier, EdgeThresholds, Mesh, Polygon};
use crate::ldraw::{color_sort_key, part_types, ColorTable, EDGE_COLOR_CODE, INHERIT_COLOR_CODE};
use nalgebra::Matrix4;
use tracing::{debug, info, warn};

/// One type 2-5 line before formatting
#[derive(Debug, Clone, PartialEq)]
struct PartLine {
    line_type: u8,
    color: String,
    values: Vec<String>,
}

impl PartLine {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.line_type, self.color);
        for value in &self.values {
            line.push(' ');
            line.push_str(value);
        }
        line
    }
}

pub struct LineSerializer<'a> {
    options: &'a ExportOptions,
    colors: &'a ColorTable,
}

impl<'a> LineSerializer<'a> {
    pub fn new(options: &'a ExportOptions, colors: &'a ColorTable) -> Self {
        Self { options, colors }
    }

    /// Produce the lines of the file.
    ///
    /// Fails only when there is no active object or it has no name; objects
    /// with missing metadata are logged and left out.
    pub fn serialize(&self, scene: &ExportScene) -> Result<Vec<String>, ExportError> {
        let active = scene.active_object().ok_or(ExportError::NoActiveObject)?;
        if active.props.name.trim().is_empty() {
            return Err(ExportError::MissingName {
                object: active.name.clone(),
            });
        }

        let mut lines = header_lines(&active.props);

        let (polygon_objects, subfile_objects): (Vec<usize>, Vec<usize>) = scene
            .objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.linked && (!self.options.selection_only || object.selected))
            .map(|(index, _)| index)
            .partition(|&index| scene.objects[index].props.export_polygons);

        if !subfile_objects.is_empty() {
            lines.push(String::new());
        }
        for &index in &subfile_objects {
            match self.subfile_line(scene, index) {
                Ok(line) => lines.push(line),
                Err(err) => warn!(%err, "skipping object"),
            }
        }

        if !polygon_objects.is_empty() {
            lines.push(String::new());
        }
        let mut part_lines = Vec::new();
        for &index in &polygon_objects {
            match self.polygon_lines(scene, index) {
                Ok(object_lines) => part_lines.extend(object_lines),
                Err(err) => warn!(%err, "skipping object"),
            }
        }
        let part_line_count = part_lines.len();
        lines.extend(self.group_by_color(part_lines));

        info!(
            subfiles = subfile_objects.len(),
            polygon_objects = polygon_objects.len(),
            part_lines = part_line_count,
            "serialized scene"
        );

        Ok(lines)
    }

    fn subfile_line(&self, scene: &ExportScene, index: usize) -> Result<String, ExportError> {
        let object = &scene.objects[index];
        let props = &object.props;

        let filename = props.filename.trim();
        if filename.is_empty() {
            return Err(ExportError::MissingFilename {
                object: object.name.clone(),
            });
        }
        if props.color_code.trim().is_empty() {
            return Err(ExportError::MissingColorCode {
                object: object.name.clone(),
            });
        }

        let color = self.colors.get(&props.color_code).code;
        let matrix = self.export_matrix(scene, index);
        let precision = self.precision(props);
        let f = |row: usize, col: usize| format_decimal(matrix[(row, col)], precision);

        Ok(format!(
            "1 {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            color,
            f(0, 3),
            f(1, 3),
            f(2, 3),
            f(0, 0),
            f(0, 1),
            f(0, 2),
            f(1, 0),
            f(1, 1),
            f(1, 2),
            f(2, 0),
            f(2, 1),
            f(2, 2),
            filename
        ))
    }

    fn polygon_lines(&self, scene: &ExportScene, index: usize) -> Result<Vec<PartLine>, ExportError> {
        let object = &scene.objects[index];
        let props = &object.props;

        let Some(source) = &object.mesh else {
            debug!(object = %object.name, "object has no mesh");
            return Ok(Vec::new());
        };
        if props.color_code.trim().is_empty() {
            return Err(ExportError::MissingColorCode {
                object: object.name.clone(),
            });
        }
        let object_color = self.colors.get(&props.color_code).code;

        let mut mesh = source.clone();
        self.clean_mesh(&mut mesh);

        let matrix = self.export_matrix(scene, index);
        let precision = self.precision(props);
        let coords = |indices: &[usize]| -> Vec<String> {
            indices
                .iter()
                .flat_map(|&i| {
                    let p = matrix.transform_point(&mesh.vertices[i]);
                    [p.x, p.y, p.z].map(|c| format_decimal(c, precision))
                })
                .collect()
        };

        let mut lines = Vec::new();
        let mut skipped = 0;
        for polygon in &mesh.polygons {
            let line_type = match polygon.len() {
                3 => 3,
                4 => 4,
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            lines.push(PartLine {
                line_type,
                color: self.face_color(&mesh, polygon, &object_color),
                values: coords(&polygon.indices),
            });
        }
        if skipped > 0 {
            debug!(object = %object.name, skipped, "skipped polygons with more than four corners");
        }

        let thresholds = EdgeThresholds {
            flat_angle: self.options.flat_angle,
            sharp_angle: self.options.sharp_angle,
        };
        let classification =
            EdgeClassifier::new(thresholds).classify(&mesh, &mesh.adjacency(), &mesh.sharp_edges());

        for key in &classification.sharp {
            lines.push(PartLine {
                line_type: 2,
                color: EDGE_COLOR_CODE.to_string(),
                values: coords(&[key.0, key.1]),
            });
        }

        if props.export_shade_smooth {
            for line in &classification.conditional {
                let [a, b] = line.endpoints;
                let [c1, c2] = line.controls;
                lines.push(PartLine {
                    line_type: 5,
                    color: EDGE_COLOR_CODE.to_string(),
                    values: coords(&[a, b, c1, c2]),
                });
            }
        }

        debug!(
            object = %object.name,
            lines = lines.len(),
            sharp = classification.sharp.len(),
            conditional = classification.conditional.len(),
            "exported polygons"
        );

        Ok(lines)
    }

    /// Triangulate, weld and fix normals as configured
    fn clean_mesh(&self, mesh: &mut Mesh) {
        mesh.recompute_face_normals();

        if self.options.triangulate {
            mesh.triangulate(|_| true);
        } else if self.options.ngon_handling == NgonHandling::Triangulate {
            mesh.triangulate(|polygon| polygon.len() > 4);
        }

        if self.options.remove_doubles {
            mesh.weld_vertices(self.options.merge_distance);
        }

        if self.options.recalculate_normals {
            mesh.recalculate_normals();
        } else {
            mesh.recompute_face_normals();
        }
    }

    /// Material color, or the object's color for inheriting materials
    fn face_color(&self, mesh: &Mesh, polygon: &Polygon, object_color: &str) -> String {
        let code = mesh
            .materials
            .get(polygon.material_index)
            .map(|material| self.colors.get(&material.color_code).code)
            .unwrap_or_else(|| INHERIT_COLOR_CODE.to_string());

        if code == INHERIT_COLOR_CODE {
            object_color.to_string()
        } else {
            code
        }
    }

    fn precision(&self, props: &LDrawProps) -> u32 {
        props.export_precision.unwrap_or(self.options.export_precision)
    }

    fn export_matrix(&self, scene: &ExportScene, index: usize) -> Matrix4<f64> {
        scene.export_matrix(index, self.options.import_scale, self.options.gap_scale)
    }

    /// Stable sort by (color, line type), one comment per color run
    fn group_by_color(&self, mut part_lines: Vec<PartLine>) -> Vec<String> {
        part_lines.sort_by_key(|line| (color_sort_key(&line.color), line.line_type));

        let mut lines = Vec::with_capacity(part_lines.len() * 2);
        let mut current: Option<i64> = None;
        for line in &part_lines {
            let key = color_sort_key(&line.color);
            if current != Some(key) {
                if current.is_some() {
                    lines.push(String::new());
                }
                current = Some(key);
                lines.push(format!("0 // {}", self.colors.get(&line.color).name));
            }
            lines.push(line.render());
        }
        lines
    }
}

/// File header from the active object's props
fn header_lines(props: &LDrawProps) -> Vec<String> {
    let mut lines = Vec::new();

    if !props.description.trim().is_empty() {
        lines.push(format!("0 {}", props.description.trim()));
    }
    lines.push(format!("0 Name: {}", props.name.trim()));
    if !props.author.trim().is_empty() {
        lines.push(format!("0 Author: {}", props.author.trim()));
    }

    let part_type = non_empty(&props.part_type).filter(|t| !part_types::is_like_model(Some(*t)));
    if let Some(part_type) = part_type {
        let mut org = format!("0 !LDRAW_ORG {}", part_type);
        if let Some(qualifier) = non_empty(&props.optional_qualifier) {
            org.push(' ');
            org.push_str(qualifier);
        }
        if let Some(date) = non_empty(&props.update_date) {
            org.push_str(" UPDATE ");
            org.push_str(date);
        }
        lines.push(org);
    }

    if let Some(license) = non_empty(&props.license) {
        lines.push(format!("0 !LICENSE {}", license));
    }

    lines
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::scene::SceneObject;
    use crate::ldraw::Color;
    use nalgebra::{Point3, Vector3};

    fn colors() -> ColorTable {
        let mut table = ColorTable::with_defaults();
        table.insert(Color::new("1", "Blue"));
        table.insert(Color::new("4", "Red"));
        table
    }

    fn part_line(line_type: u8, color: &str) -> PartLine {
        PartLine {
            line_type,
            color: color.to_string(),
            values: vec!["0".to_string()],
        }
    }

    fn active_scene() -> ExportScene {
        let mut scene = ExportScene::new();
        let mut root = SceneObject::new("root");
        root.props.name = "model.ldr".to_string();
        root.selected = true;
        scene.active = Some(scene.add_object(root));
        scene
    }

    #[test]
    fn test_sort_and_group_by_color() {
        let options = ExportOptions::default();
        let table = colors();
        let serializer = LineSerializer::new(&options, &table);

        let lines = serializer.group_by_color(vec![
            part_line(3, "16"),
            part_line(2, "1"),
            part_line(4, "16"),
            part_line(3, "4"),
        ]);

        assert_eq!(
            lines,
            vec![
                "0 // Blue",
                "2 1 0",
                "",
                "0 // Red",
                "3 4 0",
                "",
                "0 // Main_Colour",
                "3 16 0",
                "4 16 0",
            ]
        );
    }

    #[test]
    fn test_group_sort_is_stable_within_key() {
        let options = ExportOptions::default();
        let table = colors();
        let serializer = LineSerializer::new(&options, &table);

        let mut first = part_line(3, "4");
        first.values = vec!["first".to_string()];
        let mut second = part_line(3, "4");
        second.values = vec!["second".to_string()];

        let lines = serializer.group_by_color(vec![first, part_line(2, "4"), second]);
        assert_eq!(lines, vec!["0 // Red", "2 4 0", "3 4 first", "3 4 second"]);
    }

    #[test]
    fn test_equal_color_keys_share_one_group() {
        let options = ExportOptions::default();
        let table = colors();
        let serializer = LineSerializer::new(&options, &table);

        let lines = serializer.group_by_color(vec![part_line(3, "04"), part_line(2, "4")]);
        assert_eq!(lines.iter().filter(|l| l.starts_with("0 // ")).count(), 1);
        assert!(!lines.contains(&String::new()));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_object_precision_falls_back_to_options() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(1.23456, 0.0, 0.0));
        mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(2.0, 1.0, 0.0));
        mesh.add_polygon(Polygon::new(vec![0, 1, 2], 0));

        let mut scene = active_scene();
        let mut object = SceneObject::with_mesh("sliver", mesh);
        object.selected = true;
        object.props.color_code = "4".to_string();
        let index = scene.add_object(object);

        let table = colors();
        let options = ExportOptions {
            export_precision: 4,
            ..ExportOptions::default()
        };
        let triangle = |lines: Vec<String>| {
            lines
                .into_iter()
                .find(|l| l.starts_with("3 4 "))
                .unwrap_or_default()
        };

        let lines = LineSerializer::new(&options, &table).serialize(&scene).unwrap();
        assert!(triangle(lines).contains(" 1.2346 0 0"));

        scene.objects[index].props.export_precision = Some(1);
        let lines = LineSerializer::new(&options, &table).serialize(&scene).unwrap();
        let line = triangle(lines);
        assert!(line.contains(" 1.2 0 0"));
        assert!(!line.contains("1.23"));
    }

    #[test]
    fn test_no_active_object_aborts() {
        let options = ExportOptions::default();
        let table = colors();
        let result = LineSerializer::new(&options, &table).serialize(&ExportScene::new());
        assert_eq!(result, Err(ExportError::NoActiveObject));
    }

    #[test]
    fn test_nameless_active_object_aborts() {
        let mut scene = active_scene();
        scene.objects[0].props.name.clear();

        let options = ExportOptions::default();
        let table = colors();
        let result = LineSerializer::new(&options, &table).serialize(&scene);
        assert_eq!(
            result,
            Err(ExportError::MissingName {
                object: "root".to_string()
            })
        );
    }

    #[test]
    fn test_header_for_part_and_model() {
        let props = LDrawProps {
            description: "Brick 2 x 4".to_string(),
            name: "3001.dat".to_string(),
            author: "James Jessiman".to_string(),
            part_type: Some("Part".to_string()),
            update_date: Some("2004-03".to_string()),
            license: Some("Licensed under CC BY 4.0".to_string()),
            ..LDrawProps::default()
        };
        assert_eq!(
            header_lines(&props),
            vec![
                "0 Brick 2 x 4",
                "0 Name: 3001.dat",
                "0 Author: James Jessiman",
                "0 !LDRAW_ORG Part UPDATE 2004-03",
                "0 !LICENSE Licensed under CC BY 4.0",
            ]
        );

        let model = LDrawProps {
            name: "house.ldr".to_string(),
            part_type: Some("Model".to_string()),
            ..LDrawProps::default()
        };
        assert_eq!(header_lines(&model), vec!["0 Name: house.ldr"]);
    }

    #[test]
    fn test_subfile_lines_and_skipped_objects() {
        let mut scene = active_scene();

        let mut brick = SceneObject::new("brick");
        brick.selected = true;
        brick.props.filename = "3001.dat".to_string();
        brick.props.color_code = "4".to_string();
        brick.matrix_world = Matrix4::new_translation(&Vector3::new(20.0, 0.0, -8.0));
        scene.add_object(brick);

        let mut nameless = SceneObject::new("nameless");
        nameless.selected = true;
        scene.add_object(nameless);

        let mut unselected = SceneObject::new("unselected");
        unselected.props.filename = "3002.dat".to_string();
        scene.add_object(unselected);

        let mut unlinked = SceneObject::new("unlinked");
        unlinked.selected = true;
        unlinked.linked = false;
        unlinked.props.filename = "3003.dat".to_string();
        scene.add_object(unlinked);

        let options = ExportOptions::default();
        let table = colors();
        let lines = LineSerializer::new(&options, &table).serialize(&scene).unwrap();

        // The active object has no filename and is skipped as well
        assert_eq!(
            lines,
            vec![
                "0 Name: model.ldr",
                "",
                "1 4 20 8 0 1 0 0 0 0 -1 0 1 0 3001.dat",
            ]
        );
    }

    #[test]
    fn test_polygon_object_with_ngon_skip() {
        let mut mesh = Mesh::new();
        for (x, y) in [(0.0, 0.0), (2.0, 0.0), (3.0, 1.0), (2.0, 2.0), (0.0, 2.0)] {
            mesh.add_vertex(Point3::new(x, y, 0.0));
        }
        mesh.add_polygon(Polygon::new(vec![0, 1, 2, 3, 4], 0));

        let mut scene = active_scene();
        let mut object = SceneObject::with_mesh("pentagon", mesh);
        object.selected = true;
        object.props.color_code = "1".to_string();
        scene.add_object(object);

        let table = colors();

        let skip = ExportOptions {
            ngon_handling: NgonHandling::Skip,
            ..ExportOptions::default()
        };
        let lines = LineSerializer::new(&skip, &table).serialize(&scene).unwrap();
        // One separator for the (skipped) root reference, one for polygons
        assert_eq!(lines, vec!["0 Name: model.ldr", "", ""]);

        let lines = LineSerializer::new(&ExportOptions::default(), &table)
            .serialize(&scene)
            .unwrap();
        let triangles = lines.iter().filter(|l| l.starts_with("3 1 ")).count();
        assert_eq!(triangles, 3);
        assert!(lines.contains(&"0 // Blue".to_string()));
    }
}
