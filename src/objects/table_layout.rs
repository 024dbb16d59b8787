//! Preset cushion and pocket geometry generated from `TableSpecs`
//!
//! Segment numbering runs counter-clockwise around the table starting at the bottom
//! left corner; jaw arcs carry the number of the straight segment they round off plus
//! a `t` suffix.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

use glam::DVec3;

use super::table::{
    CircularCushionSegment, CushionDirection, LinearCushionSegment, Pocket, TableSpecs,
};
use crate::error::GeometryError;

use CushionDirection::{Side1, Side2};

fn linear(
    id: &str,
    p1: (f64, f64),
    p2: (f64, f64),
    h: f64,
    dir: CushionDirection,
) -> Result<LinearCushionSegment, GeometryError> {
    LinearCushionSegment::new(id, DVec3::new(p1.0, p1.1, h), DVec3::new(p2.0, p2.1, h), dir)
}

fn circular(
    id: &str,
    c: (f64, f64),
    h: f64,
    radius: f64,
) -> Result<CircularCushionSegment, GeometryError> {
    CircularCushionSegment::new(id, DVec3::new(c.0, c.1, h), radius)
}

/// Four rails along the edges of the playing surface
pub fn billiard_cushions(specs: &TableSpecs) -> Result<Vec<LinearCushionSegment>, GeometryError> {
    let (w, l, h) = (specs.w, specs.l, specs.cushion_height);
    Ok(vec![
        linear("3", (0.0, 0.0), (0.0, l), h, Side2)?,
        linear("12", (w, l), (w, 0.0), h, Side1)?,
        linear("9", (0.0, l), (w, l), h, Side1)?,
        linear("18", (0.0, 0.0), (w, 0.0), h, Side2)?,
    ])
}

/// Rails, corner and side jaws of a six-pocket table
pub fn pocket_cushions(
    specs: &TableSpecs,
) -> Result<(Vec<LinearCushionSegment>, Vec<CircularCushionSegment>), GeometryError> {
    let (w, l, h) = (specs.w, specs.l, specs.cushion_height);
    let cw = specs.cushion_width;
    let ca = (specs.corner_pocket_angle + 45.0).to_radians();
    let sa = specs.side_pocket_angle.to_radians();
    let sw = specs.side_pocket_width;
    let rc = specs.corner_jaw_radius;
    let rs = specs.side_jaw_radius;
    // Where the corner / side jaw arcs meet the straight rails
    let dc = rc / ((FRAC_PI_2 + ca) / 2.0).tan();
    let ds = rs / ((FRAC_PI_2 + sa) / 2.0).tan();
    // Rail end at the corner pocket mouth
    let pc = specs.corner_pocket_width * FRAC_PI_4.cos();

    let (ca_sin, ca_cos, ca_tan) = (ca.sin(), ca.cos(), ca.tan());
    let (sa_sin, sa_cos) = (sa.sin(), sa.cos());

    let lines = vec![
        // long rails
        linear("3", (0.0, pc + dc), (0.0, (l - sw) / 2.0 - ds), h, Side2)?,
        linear("6", (0.0, (l + sw) / 2.0 + ds), (0.0, l - pc - dc), h, Side2)?,
        linear("15", (w, pc + dc), (w, (l - sw) / 2.0 - ds), h, Side1)?,
        linear("12", (w, (l + sw) / 2.0 + ds), (w, l - pc - dc), h, Side1)?,
        // short rails
        linear("18", (pc + dc, 0.0), (w - pc - dc, 0.0), h, Side2)?,
        linear("9", (pc + dc, l), (w - pc - dc, l), h, Side1)?,
        // side jaws
        linear(
            "5",
            (-cw, (l + sw) / 2.0 - cw * sa_sin),
            (-ds * sa_cos, (l + sw) / 2.0 - ds * sa_sin),
            h,
            Side1,
        )?,
        linear(
            "4",
            (-cw, (l - sw) / 2.0 + cw * sa_sin),
            (-ds * sa_cos, (l - sw) / 2.0 + ds * sa_sin),
            h,
            Side2,
        )?,
        linear(
            "13",
            (w + cw, (l + sw) / 2.0 - cw * sa_sin),
            (w + ds * sa_cos, (l + sw) / 2.0 - ds * sa_sin),
            h,
            Side1,
        )?,
        linear(
            "14",
            (w + cw, (l - sw) / 2.0 + cw * sa_sin),
            (w + ds * sa_cos, (l - sw) / 2.0 + ds * sa_sin),
            h,
            Side2,
        )?,
        // corner jaws
        linear("1", (pc - cw * ca_tan, -cw), (pc - dc * ca_sin, -dc * ca_cos), h, Side2)?,
        linear("2", (-cw, pc - cw * ca_tan), (-dc * ca_cos, pc - dc * ca_sin), h, Side1)?,
        linear("8", (pc - cw * ca_tan, l + cw), (pc - dc * ca_sin, l + dc * ca_cos), h, Side1)?,
        linear("7", (-cw, l - pc + cw * ca_tan), (-dc * ca_cos, l - pc + dc * ca_sin), h, Side2)?,
        linear(
            "11",
            (w + cw, l - pc + cw * ca_tan),
            (w + dc * ca_cos, l - pc + dc * ca_sin),
            h,
            Side2,
        )?,
        linear(
            "10",
            (w - pc + cw * ca_tan, l + cw),
            (w - pc + dc * ca_sin, l + dc * ca_cos),
            h,
            Side1,
        )?,
        linear("16", (w + cw, pc - cw * ca_tan), (w + dc * ca_cos, pc - dc * ca_sin), h, Side1)?,
        linear("17", (w - pc + cw * ca_tan, -cw), (w - pc + dc * ca_sin, -dc * ca_cos), h, Side2)?,
    ];

    let arcs = vec![
        circular("1t", (pc + dc, -rc), h, rc)?,
        circular("2t", (-rc, pc + dc), h, rc)?,
        circular("4t", (-rs, l / 2.0 - sw / 2.0 - ds), h, rs)?,
        circular("5t", (-rs, l / 2.0 + sw / 2.0 + ds), h, rs)?,
        circular("7t", (-rc, l - (pc + dc)), h, rc)?,
        circular("8t", (pc + dc, l + rc), h, rc)?,
        circular("10t", (w - pc - dc, l + rc), h, rc)?,
        circular("11t", (w + rc, l - (pc + dc)), h, rc)?,
        circular("13t", (w + rs, l / 2.0 + sw / 2.0 + ds), h, rs)?,
        circular("14t", (w + rs, l / 2.0 - sw / 2.0 - ds), h, rs)?,
        circular("16t", (w + rc, pc + dc), h, rc)?,
        circular("17t", (w - pc - dc, -rc), h, rc)?,
    ];

    Ok((lines, arcs))
}

/// Six pockets: left/right (`l`/`r`) by bottom/center/top (`b`/`c`/`t`)
pub fn pocket_pockets(specs: &TableSpecs) -> Result<Vec<Pocket>, GeometryError> {
    let (w, l) = (specs.w, specs.l);
    let cr = specs.corner_pocket_radius;
    let sr = specs.side_pocket_radius;
    // Corner pocket centers sit on the diagonal, side pockets straight out
    let cd = (cr + specs.corner_pocket_depth - specs.corner_pocket_width / 2.0) / SQRT_2;
    let sd = sr + specs.side_pocket_depth;

    let at = |x: f64, y: f64| DVec3::new(x, y, 0.0);
    Ok(vec![
        Pocket::new("lb", at(-cd, -cd), cr)?,
        Pocket::new("lc", at(-sd, l / 2.0), sr)?,
        Pocket::new("lt", at(-cd, l + cd), cr)?,
        Pocket::new("rb", at(w + cd, -cd), cr)?,
        Pocket::new("rc", at(w + sd, l / 2.0), sr)?,
        Pocket::new("rt", at(w + cd, l + cd), cr)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rails_leave_room_for_pockets() {
        let specs = TableSpecs::pocket();
        let (lines, _) = pocket_cushions(&specs).unwrap();
        let rail = lines.iter().find(|s| s.id() == "3").unwrap();
        assert!(rail.p1().y > 0.0);
        assert!(rail.p2().y < specs.l / 2.0);
        assert_eq!(rail.p1().x, 0.0);
    }

    #[test]
    fn test_jaw_arcs_touch_their_rails() {
        // Rail 18 ends where jaw 1t begins: the arc's top point is on the rail line
        let specs = TableSpecs::pocket();
        let (lines, arcs) = pocket_cushions(&specs).unwrap();
        let rail = lines.iter().find(|s| s.id() == "18").unwrap();
        let arc = arcs.iter().find(|a| a.id == "1t").unwrap();
        assert!((arc.center.x - rail.p1().x).abs() < 1e-12);
        assert!((arc.center.y + arc.radius).abs() < 1e-12);
    }

    #[test]
    fn test_pockets_outside_playing_surface() {
        let specs = TableSpecs::pocket();
        for p in pocket_pockets(&specs).unwrap() {
            let (x, y) = (p.center.x, p.center.y);
            let inside = x > 0.0 && x < specs.w && y > 0.0 && y < specs.l;
            assert!(!inside, "pocket {} center inside the cloth", p.id);
        }
    }
}
