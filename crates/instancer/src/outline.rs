//! Glyph points as seen by gvar, and rebuilding glyf/loca/hmtx from them.

use kurbo::{Point, Vec2};
use read_fonts::{
    ReadError,
    tables::{
        glyf::{
            Anchor as ReadAnchor, CompositeGlyph as ReadCompositeGlyph, CurvePoint, Glyf, Glyph,
            SimpleGlyph as ReadSimpleGlyph,
        },
        gvar::GlyphDelta,
        loca::Loca,
    },
    types::GlyphId,
};
use write_fonts::tables::{
    glyf::{Bbox, CompositeGlyph, Contour, GlyfLocaBuilder, Glyph as WriteGlyph, SimpleGlyph},
    loca::LocaFormat,
};

use crate::{error::Result, metrics::FontBounds};

pub(crate) const PHANTOM_POINTS: usize = 4;

pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn round_i16(value: f64) -> i16 {
    clamp_i16(value.round() as i32)
}

/// A glyph's variable points: outline points (or component offsets)
/// followed by the four phantom points.
///
/// Phantom points start at the origin so that after deltas are applied
/// they hold the deltas themselves.
pub(crate) struct VarGlyph<'a> {
    source: Option<Glyph<'a>>,
    pub points: Vec<Point>,
    pub end_pts: Vec<usize>,
}

impl<'a> VarGlyph<'a> {
    pub fn read(loca: &Loca<'a>, glyf: &Glyf<'a>, gid: GlyphId) -> Result<Self> {
        let source = match loca.get_glyf(gid, glyf) {
            Ok(glyph) => glyph,
            Err(ReadError::OutOfBounds) => None,
            Err(e) => return Err(e.into()),
        };

        let (mut points, end_pts) = match &source {
            Some(Glyph::Simple(simple)) => simple_points(simple),
            Some(Glyph::Composite(composite)) => (composite_points(composite), Vec::new()),
            None => (Vec::new(), Vec::new()),
        };
        points.extend(std::iter::repeat_n(Point::ZERO, PHANTOM_POINTS));

        Ok(Self {
            source,
            points,
            end_pts,
        })
    }

    fn outline_len(&self) -> usize {
        self.points.len() - PHANTOM_POINTS
    }

    /// Change of the advance width encoded in the phantom points.
    pub fn advance_delta(&self) -> f64 {
        let n = self.outline_len();
        self.points[n + 1].x - self.points[n].x
    }

    pub fn apply(&mut self, deltas: &[Vec2], scalar: f64) {
        for (point, delta) in self.points.iter_mut().zip(deltas) {
            *point += *delta * scalar;
        }
    }

    /// Dense deltas of one tuple, unscaled.
    ///
    /// Sparse tuples of simple glyphs get their untouched points inferred
    /// against `base`; for composites untouched entries stay zero.
    pub fn tuple_deltas(
        &self,
        deltas: impl Iterator<Item = GlyphDelta>,
        has_all_points: bool,
        base: &[Point],
    ) -> Vec<Vec2> {
        let mut dense = vec![Vec2::ZERO; base.len()];
        let mut touched = vec![has_all_points; base.len()];

        for delta in deltas {
            let idx = delta.position as usize;
            if let Some(slot) = dense.get_mut(idx) {
                *slot = Vec2::new(f64::from(delta.x_delta), f64::from(delta.y_delta));
                touched[idx] = true;
            }
        }

        if !has_all_points {
            let mut start = 0;
            for &end in &self.end_pts {
                iup_contour(&mut dense, &touched, base, start, end);
                start = end + 1;
            }
        }

        dense
    }

    /// Rebuild the glyph from the current point positions.
    pub fn to_glyph(&self) -> WriteGlyph {
        match &self.source {
            Some(Glyph::Simple(simple)) => simple_glyph(simple, &self.points, &self.end_pts),
            Some(Glyph::Composite(composite)) => composite_glyph(composite, &self.points),
            None => WriteGlyph::Empty,
        }
    }
}

fn simple_points(simple: &ReadSimpleGlyph) -> (Vec<Point>, Vec<usize>) {
    let end_pts = simple
        .end_pts_of_contours()
        .iter()
        .map(|x| x.get() as usize)
        .collect();
    let points = simple
        .points()
        .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
        .collect();
    (points, end_pts)
}

fn composite_points(composite: &ReadCompositeGlyph) -> Vec<Point> {
    composite
        .components()
        .map(|c| match c.anchor {
            ReadAnchor::Offset { x, y } => Point::new(f64::from(x), f64::from(y)),
            ReadAnchor::Point { .. } => Point::ZERO,
        })
        .collect()
}

fn simple_glyph(simple: &ReadSimpleGlyph, points: &[Point], end_pts: &[usize]) -> WriteGlyph {
    if end_pts.is_empty() {
        return WriteGlyph::Empty;
    }

    let on_curve: Vec<bool> = simple.points().map(|p| p.on_curve).collect();
    let mut contours = Vec::with_capacity(end_pts.len());
    let mut start = 0;
    for &end in end_pts {
        let contour_points: Vec<CurvePoint> = (start..=end)
            .map(|i| CurvePoint::new(round_i16(points[i].x), round_i16(points[i].y), on_curve[i]))
            .collect();
        contours.push(Contour::from(contour_points));
        start = end + 1;
    }

    let mut glyph = SimpleGlyph {
        bbox: Bbox::default(),
        contours,
        instructions: simple.instructions().to_vec(),
    };
    glyph.recompute_bounding_box();

    WriteGlyph::Simple(glyph)
}

fn composite_glyph(composite: &ReadCompositeGlyph, offsets: &[Point]) -> WriteGlyph {
    use write_fonts::tables::glyf::{Anchor, Component, ComponentFlags, Transform};

    let mut new_components = composite.components().enumerate().map(|(i, comp)| {
        let anchor = match comp.anchor {
            ReadAnchor::Offset { .. } => Anchor::Offset {
                x: round_i16(offsets[i].x),
                y: round_i16(offsets[i].y),
            },
            ReadAnchor::Point { base, component } => Anchor::Point { base, component },
        };

        let t = comp.transform;
        let transform = Transform {
            xx: t.xx,
            yx: t.yx,
            xy: t.xy,
            yy: t.yy,
        };

        Component::new(comp.glyph, anchor, transform, ComponentFlags::default())
    });

    let Some(first) = new_components.next() else {
        return WriteGlyph::Empty;
    };
    let bbox = kurbo::Rect::new(
        composite.x_min() as f64,
        composite.y_min() as f64,
        composite.x_max() as f64,
        composite.y_max() as f64,
    );

    let mut new_composite = CompositeGlyph::new(first, bbox);
    for comp in new_components {
        new_composite.add_component(comp, kurbo::Rect::ZERO);
    }

    WriteGlyph::Composite(new_composite)
}

/// Interpolate deltas of untouched points within one contour.
fn iup_contour(deltas: &mut [Vec2], touched: &[bool], points: &[Point], start: usize, end: usize) {
    if start > end || end >= deltas.len() {
        return;
    }

    let contour_len = end - start + 1;
    let Some(first_touched) = (0..contour_len).position(|i| touched[start + i]) else {
        return;
    };

    let mut touched_points = vec![first_touched];
    let mut i = (first_touched + 1) % contour_len;
    while i != first_touched {
        if touched[start + i] {
            touched_points.push(i);
        }
        i = (i + 1) % contour_len;
    }

    if touched_points.len() == 1 {
        let d = deltas[start + first_touched];
        for i in 0..contour_len {
            deltas[start + i] = d;
        }
        return;
    }

    for window in touched_points.windows(2) {
        interpolate_between(deltas, points, start, contour_len, window[0], window[1]);
    }
    if let Some(&last) = touched_points.last() {
        interpolate_between(deltas, points, start, contour_len, last, first_touched);
    }
}

fn interpolate_between(
    deltas: &mut [Vec2],
    points: &[Point],
    start: usize,
    contour_len: usize,
    touch1: usize,
    touch2: usize,
) {
    if (touch1 + 1) % contour_len == touch2 {
        return;
    }

    let p1 = points[start + touch1];
    let p2 = points[start + touch2];
    let d1 = deltas[start + touch1];
    let d2 = deltas[start + touch2];

    let mut i = (touch1 + 1) % contour_len;
    while i != touch2 {
        let p = points[start + i];
        deltas[start + i] = Vec2::new(
            iup_single(p1.x, p2.x, p.x, d1.x, d2.x),
            iup_single(p1.y, p2.y, p.y, d1.y, d2.y),
        );
        i = (i + 1) % contour_len;
    }
}

fn iup_single(c1: f64, c2: f64, c: f64, d1: f64, d2: f64) -> f64 {
    if c1 == c2 {
        return if d1 == d2 { d1 } else { 0.0 };
    }

    let (c1, c2, d1, d2) = if c1 > c2 { (c2, c1, d2, d1) } else { (c1, c2, d1, d2) };

    if c <= c1 {
        d1
    } else if c >= c2 {
        d2
    } else {
        d1 + (c - c1) / (c2 - c1) * (d2 - d1)
    }
}

/// Rebuilt outline tables plus the metrics derived from them.
pub(crate) struct Outlines {
    pub glyf_loca: (
        write_fonts::tables::glyf::Glyf,
        write_fonts::tables::loca::Loca,
        LocaFormat,
    ),
    pub hmtx: write_fonts::tables::hmtx::Hmtx,
    pub bounds: FontBounds,
}

/// Resolve composite bounds, then build glyf, loca and hmtx.
///
/// Left side bearings follow each glyph's new xMin; empty glyphs keep
/// `fallback_lsbs`.
pub(crate) fn assemble(
    mut glyphs: Vec<WriteGlyph>,
    advances: &[u16],
    fallback_lsbs: &[i16],
    num_h_metrics: usize,
) -> Result<Outlines> {
    let mut bboxes: Vec<Option<Bbox>> = glyphs
        .iter()
        .map(|glyph| match glyph {
            WriteGlyph::Simple(simple) => Some(simple.bbox),
            WriteGlyph::Composite(_) | WriteGlyph::Empty => None,
        })
        .collect();
    recompute_composite_bboxes(&mut glyphs, &mut bboxes);

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut bounds = FontBounds::new();
    let mut lsbs: Vec<i16> = Vec::with_capacity(glyphs.len());

    for (i, glyph) in glyphs.iter().enumerate() {
        let lsb = glyph_xmin(glyph).unwrap_or(fallback_lsbs[i]);
        lsbs.push(lsb);
        bounds.update(glyph, advances[i]);
        glyf_builder.add_glyph(glyph)?;
    }
    bounds.finalize();

    Ok(Outlines {
        glyf_loca: glyf_builder.build(),
        hmtx: crate::metrics::build_new_hmtx(advances, &lsbs, num_h_metrics),
        bounds,
    })
}

/// Recompute bounding boxes for composite glyphs from their components.
///
/// Nested composites resolve over several passes.
fn recompute_composite_bboxes(glyphs: &mut [WriteGlyph], bboxes: &mut [Option<Bbox>]) {
    let mut changed = true;
    while changed {
        changed = false;
        for glyph_id in 0..glyphs.len() {
            if bboxes[glyph_id].is_some() {
                continue;
            }

            let WriteGlyph::Composite(composite) = &glyphs[glyph_id] else {
                continue;
            };

            if let Some(new_bbox) = compute_composite_bbox(composite, bboxes) {
                bboxes[glyph_id] = Some(new_bbox);
                if let WriteGlyph::Composite(c) = &mut glyphs[glyph_id] {
                    c.bbox = new_bbox;
                }
                changed = true;
            }
        }
    }
}

/// Returns None while a non-empty component is still unresolved.
fn compute_composite_bbox(composite: &CompositeGlyph, bboxes: &[Option<Bbox>]) -> Option<Bbox> {
    use write_fonts::tables::glyf::Anchor;

    let mut rect: Option<kurbo::Rect> = None;

    for comp in composite.components() {
        let component_bbox = match bboxes.get(comp.glyph.to_u32() as usize) {
            Some(Some(bbox)) => bbox,
            Some(None) => continue,
            None => return None,
        };
        if component_bbox.x_min == 0
            && component_bbox.x_max == 0
            && component_bbox.y_min == 0
            && component_bbox.y_max == 0
        {
            continue;
        }

        let offset = match comp.anchor {
            Anchor::Offset { x, y } => Vec2::new(f64::from(x), f64::from(y)),
            Anchor::Point { .. } => Vec2::ZERO,
        };
        let t = &comp.transform;
        let affine = kurbo::Affine::new([
            f64::from(t.xx.to_f32()),
            f64::from(t.yx.to_f32()),
            f64::from(t.xy.to_f32()),
            f64::from(t.yy.to_f32()),
            offset.x,
            offset.y,
        ]);

        let corners = [
            (component_bbox.x_min, component_bbox.y_min),
            (component_bbox.x_min, component_bbox.y_max),
            (component_bbox.x_max, component_bbox.y_min),
            (component_bbox.x_max, component_bbox.y_max),
        ];
        for (x, y) in corners {
            let p = affine * Point::new(f64::from(x), f64::from(y));
            let p = Point::new(p.x.round(), p.y.round());
            rect = Some(match rect {
                Some(r) => r.union_pt(p),
                None => kurbo::Rect::from_points(p, p),
            });
        }
    }

    Some(rect.map_or_else(Bbox::default, |r| Bbox {
        x_min: round_i16(r.x0),
        y_min: round_i16(r.y0),
        x_max: round_i16(r.x1),
        y_max: round_i16(r.y1),
    }))
}

fn glyph_xmin(glyph: &WriteGlyph) -> Option<i16> {
    match glyph {
        WriteGlyph::Simple(s) => Some(s.bbox.x_min),
        WriteGlyph::Composite(c) => Some(c.bbox.x_min),
        WriteGlyph::Empty => None,
    }
}
