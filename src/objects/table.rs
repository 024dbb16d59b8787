//! Table geometry: cushion segments and pockets
//!
//! Features:
//! - Linear segments store their line `lx·x + ly·y + l0 = 0` and unit normal
//! - Segments are built through validating constructors, including on deserialize
//! - Pockets carry a potting point pulled toward the table center for aiming

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::table_layout;
use crate::error::GeometryError;

/// Default depth a pocketed ball sinks to (m)
pub const POCKET_DEPTH: f64 = 0.08;

/// Which side of a linear cushion balls can reach it from.
///
/// The playing surface usually lies on one side only. The flag is part of each
/// segment's configuration; there is no general rule tying it to the endpoint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum CushionDirection {
    Side1 = 0,
    Side2 = 1,
    #[default]
    Both = 2,
}

impl TryFrom<u8> for CushionDirection {
    type Error = GeometryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CushionDirection::Side1),
            1 => Ok(CushionDirection::Side2),
            2 => Ok(CushionDirection::Both),
            other => Err(GeometryError::InvalidDirection(other)),
        }
    }
}

impl From<CushionDirection> for u8 {
    fn from(direction: CushionDirection) -> u8 {
        direction as u8
    }
}

impl CushionDirection {
    /// Signs of the `± R·|l|` offset of the line equation checked for this flag
    pub fn offsets(self) -> &'static [f64] {
        match self {
            CushionDirection::Side1 => &[1.0],
            CushionDirection::Side2 => &[-1.0],
            CushionDirection::Both => &[1.0, -1.0],
        }
    }
}

/// Raw description of a linear cushion, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSegmentSpec {
    pub id: String,
    pub p1: DVec3,
    pub p2: DVec3,
    #[serde(default)]
    pub direction: CushionDirection,
}

/// Straight cushion between `p1` and `p2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinearSegmentSpec", into = "LinearSegmentSpec")]
pub struct LinearCushionSegment {
    id: String,
    p1: DVec3,
    p2: DVec3,
    direction: CushionDirection,
    lx: f64,
    ly: f64,
    l0: f64,
    normal: DVec3,
}

impl LinearCushionSegment {
    pub fn new(
        id: impl Into<String>,
        p1: DVec3,
        p2: DVec3,
        direction: CushionDirection,
    ) -> Result<Self, GeometryError> {
        let id = id.into();
        if p1.z != p2.z {
            return Err(GeometryError::MismatchedHeights { id, z1: p1.z, z2: p2.z });
        }
        if p1.x == p2.x && p1.y == p2.y {
            return Err(GeometryError::DegenerateSegment { id });
        }

        let (lx, ly, l0) = if p2.x == p1.x {
            (1.0, 0.0, -p1.x)
        } else {
            let slope = (p2.y - p1.y) / (p2.x - p1.x);
            (-slope, 1.0, slope * p1.x - p1.y)
        };
        let normal = DVec3::new(lx, ly, 0.0).normalize();

        Ok(Self { id, p1, p2, direction, lx, ly, l0, normal })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn p1(&self) -> DVec3 {
        self.p1
    }

    pub fn p2(&self) -> DVec3 {
        self.p2
    }

    pub fn direction(&self) -> CushionDirection {
        self.direction
    }

    /// Height of the cushion nose above the cloth
    pub fn height(&self) -> f64 {
        self.p1.z
    }

    /// Line coefficients `(lx, ly, l0)`
    pub fn line(&self) -> (f64, f64, f64) {
        (self.lx, self.ly, self.l0)
    }

    /// Unit normal of the line; its sign is arbitrary
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Signed distance from the line to the xy projection of `p`
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        (self.lx * p.x + self.ly * p.y + self.l0) / self.lx.hypot(self.ly)
    }

    /// Position of the foot of the perpendicular from `p` along the segment; `[0, 1]` is
    /// on the segment
    pub fn projection(&self, p: DVec3) -> f64 {
        let d = (self.p2 - self.p1).truncate();
        -(self.p1 - p).truncate().dot(d) / d.length_squared()
    }
}

impl TryFrom<LinearSegmentSpec> for LinearCushionSegment {
    type Error = GeometryError;

    fn try_from(spec: LinearSegmentSpec) -> Result<Self, Self::Error> {
        Self::new(spec.id, spec.p1, spec.p2, spec.direction)
    }
}

impl From<LinearCushionSegment> for LinearSegmentSpec {
    fn from(seg: LinearCushionSegment) -> Self {
        Self { id: seg.id, p1: seg.p1, p2: seg.p2, direction: seg.direction }
    }
}

/// Rounded cushion (pocket jaw); the z of `center` is the cushion height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularCushionSegment {
    pub id: String,
    pub center: DVec3,
    pub radius: f64,
}

impl CircularCushionSegment {
    pub fn new(id: impl Into<String>, center: DVec3, radius: f64) -> Result<Self, GeometryError> {
        let seg = Self { id: id.into(), center, radius };
        seg.validate()?;
        Ok(seg)
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if !(self.radius > 0.0) {
            return Err(GeometryError::NonPositiveRadius {
                what: "circular cushion",
                id: self.id.clone(),
                radius: self.radius,
            });
        }
        Ok(())
    }

    pub fn height(&self) -> f64 {
        self.center.z
    }

    /// Horizontal unit vector from the segment center to `p`
    pub fn normal_at(&self, p: DVec3) -> DVec3 {
        (p - self.center).with_z(0.0).normalize_or_zero()
    }
}

/// A pocket; `radius` is the capture radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub id: String,
    pub center: DVec3,
    pub radius: f64,
    pub depth: f64,
    /// Aim point for pots, shifted from the center toward the playing surface
    pub potting_point: DVec3,
    /// Balls that have dropped into this pocket
    pub contains: BTreeSet<String>,
}

impl Pocket {
    pub fn new(id: impl Into<String>, center: DVec3, radius: f64) -> Result<Self, GeometryError> {
        let pocket = Self {
            id: id.into(),
            center,
            radius,
            depth: POCKET_DEPTH,
            potting_point: center,
            contains: BTreeSet::new(),
        };
        pocket.validate()?;
        Ok(pocket)
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if !(self.radius > 0.0) {
            return Err(GeometryError::NonPositiveRadius {
                what: "pocket",
                id: self.id.clone(),
                radius: self.radius,
            });
        }
        if !(self.depth >= 0.0) {
            return Err(GeometryError::InvalidSpecs(format!("pocket {}: negative depth", self.id)));
        }
        Ok(())
    }

    /// Move the potting point one capture radius toward `table_center` along each axis
    /// where the pocket is off-center
    fn aim_potting_point(&mut self, table_center: DVec3) {
        let toward = table_center - self.center;
        let step = |d: f64| if d.abs() > 1e-9 { d.signum() * self.radius } else { 0.0 };
        self.potting_point = self.center + DVec3::new(step(toward.x), step(toward.y), 0.0);
    }
}

/// Table families with preset geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TableType {
    #[default]
    Pocket,
    Snooker,
    Billiard,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Pocket => "pocket",
            TableType::Snooker => "snooker",
            TableType::Billiard => "billiard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pocket" | "pool" => Some(TableType::Pocket),
            "snooker" => Some(TableType::Snooker),
            "billiard" | "carom" => Some(TableType::Billiard),
            _ => None,
        }
    }
}

/// Dimensions a table layout is generated from (m, angles in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableSpecs {
    pub table_type: TableType,
    /// Playing surface length (y extent)
    pub l: f64,
    /// Playing surface width (x extent)
    pub w: f64,
    pub cushion_width: f64,
    pub cushion_height: f64,
    pub corner_pocket_width: f64,
    pub corner_pocket_angle: f64,
    pub corner_pocket_depth: f64,
    pub corner_pocket_radius: f64,
    pub corner_jaw_radius: f64,
    pub side_pocket_width: f64,
    pub side_pocket_angle: f64,
    pub side_pocket_depth: f64,
    pub side_pocket_radius: f64,
    pub side_jaw_radius: f64,
}

impl Default for TableSpecs {
    fn default() -> Self {
        Self::pocket()
    }
}

impl TableSpecs {
    /// 7-foot pool table
    pub fn pocket() -> Self {
        Self {
            table_type: TableType::Pocket,
            l: 1.9812,
            w: 1.9812 / 2.0,
            cushion_width: 2.0 * 2.54 / 100.0,
            cushion_height: 0.64 * 2.0 * 0.028575,
            corner_pocket_width: 0.118,
            corner_pocket_angle: 5.3,
            corner_pocket_depth: 0.0398,
            corner_pocket_radius: 0.124 / 2.0,
            corner_jaw_radius: 0.0419 / 2.0,
            side_pocket_width: 0.137,
            side_pocket_angle: 7.14,
            side_pocket_depth: 0.00437,
            side_pocket_radius: 0.129 / 2.0,
            side_jaw_radius: 0.0159 / 2.0,
        }
    }

    /// Full-size snooker table with pool-style pocket cuts
    pub fn snooker() -> Self {
        Self { table_type: TableType::Snooker, l: 3.5869, w: 1.778, ..Self::pocket() }
    }

    /// 10-foot pocketless table
    pub fn billiard() -> Self {
        Self { table_type: TableType::Billiard, l: 3.05, w: 3.05 / 2.0, ..Self::pocket() }
    }

    pub fn for_type(table_type: TableType) -> Self {
        match table_type {
            TableType::Pocket => Self::pocket(),
            TableType::Snooker => Self::snooker(),
            TableType::Billiard => Self::billiard(),
        }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        let invalid = |msg: &str| Err(GeometryError::InvalidSpecs(msg.to_string()));
        if !(self.l > 0.0 && self.w > 0.0) {
            return invalid("table length and width must be positive");
        }
        if !(self.cushion_height > 0.0 && self.cushion_width > 0.0) {
            return invalid("cushion height and width must be positive");
        }
        if self.table_type == TableType::Billiard {
            return Ok(());
        }
        let sizes = [
            self.corner_pocket_width,
            self.corner_pocket_radius,
            self.corner_jaw_radius,
            self.side_pocket_width,
            self.side_pocket_radius,
            self.side_jaw_radius,
        ];
        if !sizes.iter().all(|&x| x > 0.0) {
            return invalid("pocket widths and radii must be positive");
        }
        if !(self.corner_pocket_depth >= 0.0 && self.side_pocket_depth >= 0.0) {
            return invalid("pocket depths must not be negative");
        }
        let angles = 0.0..45.0;
        let (corner, side) = (self.corner_pocket_angle, self.side_pocket_angle);
        if !angles.contains(&corner) || !angles.contains(&side) {
            return invalid("pocket angles must lie in [0, 45) degrees");
        }
        if self.side_pocket_width >= self.l / 2.0 || self.corner_pocket_width >= self.w / 2.0 {
            return invalid("pockets wider than the rails they cut");
        }
        Ok(())
    }
}

/// Immutable table: cushions and pockets keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub table_type: TableType,
    pub w: f64,
    pub l: f64,
    linear: BTreeMap<String, LinearCushionSegment>,
    circular: BTreeMap<String, CircularCushionSegment>,
    pockets: BTreeMap<String, Pocket>,
}

impl Table {
    /// Build a table from explicit parts.
    ///
    /// Fails on duplicate ids within a category or any invalid part. Pocket potting
    /// points are aimed at the center of the `w × l` surface.
    pub fn new(
        table_type: TableType,
        w: f64,
        l: f64,
        linear: Vec<LinearCushionSegment>,
        circular: Vec<CircularCushionSegment>,
        pockets: Vec<Pocket>,
    ) -> Result<Self, GeometryError> {
        let mut table = Self {
            table_type,
            w,
            l,
            linear: keyed("linear cushion", linear, |s| s.id.clone())?,
            circular: keyed("circular cushion", circular, |s| s.id.clone())?,
            pockets: keyed("pocket", pockets, |p| p.id.clone())?,
        };
        table.validate()?;
        let center = table.center();
        for pocket in table.pockets.values_mut() {
            pocket.aim_potting_point(center);
        }
        Ok(table)
    }

    /// Generate the preset layout for `specs`
    pub fn from_specs(specs: &TableSpecs) -> Result<Self, GeometryError> {
        specs.validate()?;
        let (linear, circular, pockets) = match specs.table_type {
            TableType::Billiard => {
                (table_layout::billiard_cushions(specs)?, Vec::new(), Vec::new())
            }
            TableType::Pocket | TableType::Snooker => {
                let (linear, circular) = table_layout::pocket_cushions(specs)?;
                (linear, circular, table_layout::pocket_pockets(specs)?)
            }
        };
        let table = Self::new(specs.table_type, specs.w, specs.l, linear, circular, pockets)?;
        log::debug!(
            "built {} table: {} linear, {} circular cushions, {} pockets",
            specs.table_type.as_str(),
            table.linear.len(),
            table.circular.len(),
            table.pockets.len()
        );
        Ok(table)
    }

    pub fn pocket_table() -> Result<Self, GeometryError> {
        Self::from_specs(&TableSpecs::pocket())
    }

    pub fn billiard_table() -> Result<Self, GeometryError> {
        Self::from_specs(&TableSpecs::billiard())
    }

    /// Re-check every invariant (used after deserializing)
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.w > 0.0 && self.l > 0.0) {
            return Err(GeometryError::InvalidSpecs(
                "table length and width must be positive".into(),
            ));
        }
        for seg in self.circular.values() {
            seg.validate()?;
        }
        for pocket in self.pockets.values() {
            pocket.validate()?;
        }
        for (id, seg) in &self.linear {
            check_key("linear cushion", id, &seg.id)?;
        }
        for (id, seg) in &self.circular {
            check_key("circular cushion", id, &seg.id)?;
        }
        for (id, pocket) in &self.pockets {
            check_key("pocket", id, &pocket.id)?;
        }
        Ok(())
    }

    pub fn center(&self) -> DVec3 {
        DVec3::new(self.w / 2.0, self.l / 2.0, 0.0)
    }

    pub fn linear_segments(&self) -> &BTreeMap<String, LinearCushionSegment> {
        &self.linear
    }

    pub fn circular_segments(&self) -> &BTreeMap<String, CircularCushionSegment> {
        &self.circular
    }

    pub fn pockets(&self) -> &BTreeMap<String, Pocket> {
        &self.pockets
    }

    pub fn linear_segment(&self, id: &str) -> Option<&LinearCushionSegment> {
        self.linear.get(id)
    }

    pub fn circular_segment(&self, id: &str) -> Option<&CircularCushionSegment> {
        self.circular.get(id)
    }

    pub fn pocket(&self, id: &str) -> Option<&Pocket> {
        self.pockets.get(id)
    }

    /// Record a ball as captured by a pocket
    pub(crate) fn pocket_mut(&mut self, id: &str) -> Option<&mut Pocket> {
        self.pockets.get_mut(id)
    }
}

fn keyed<T>(
    what: &'static str,
    items: Vec<T>,
    key: impl Fn(&T) -> String,
) -> Result<BTreeMap<String, T>, GeometryError> {
    let mut map = BTreeMap::new();
    for item in items {
        let id = key(&item);
        if map.contains_key(&id) {
            return Err(GeometryError::DuplicateId { what, id });
        }
        map.insert(id, item);
    }
    Ok(map)
}

fn check_key(what: &'static str, key: &str, id: &str) -> Result<(), GeometryError> {
    if key != id {
        return Err(GeometryError::InvalidSpecs(format!("{what} stored under {key} has id {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_heights_fail() {
        let seg = LinearCushionSegment::new(
            "x",
            DVec3::new(0.0, 0.0, 0.03),
            DVec3::new(1.0, 0.0, 0.04),
            CushionDirection::Both,
        );
        assert!(matches!(seg, Err(GeometryError::MismatchedHeights { .. })));
    }

    #[test]
    fn test_degenerate_segment_fails() {
        let p = DVec3::new(0.5, 0.5, 0.03);
        let seg = LinearCushionSegment::new("x", p, p, CushionDirection::Side1);
        assert!(matches!(seg, Err(GeometryError::DegenerateSegment { .. })));
    }

    #[test]
    fn test_vertical_line() {
        let seg = LinearCushionSegment::new(
            "3",
            DVec3::new(0.0, 0.0, 0.03),
            DVec3::new(0.0, 2.0, 0.03),
            CushionDirection::Side2,
        )
        .unwrap();
        assert_eq!(seg.line(), (1.0, 0.0, 0.0));
        assert_eq!(seg.normal(), DVec3::X);
        assert!((seg.signed_distance(DVec3::new(0.25, 1.0, 0.0)) - 0.25).abs() < 1e-15);
        assert!((seg.projection(DVec3::new(0.25, 1.0, 0.0)) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_sloped_line_distance() {
        let seg = LinearCushionSegment::new(
            "d",
            DVec3::new(0.0, 0.0, 0.03),
            DVec3::new(1.0, 1.0, 0.03),
            CushionDirection::Both,
        )
        .unwrap();
        let d = seg.signed_distance(DVec3::new(1.0, 0.0, 0.0)).abs();
        assert!((d - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_direction_flag_round_trip() {
        assert_eq!(CushionDirection::try_from(1u8), Ok(CushionDirection::Side2));
        assert_eq!(CushionDirection::try_from(3u8), Err(GeometryError::InvalidDirection(3)));
        assert_eq!(u8::from(CushionDirection::Both), 2);
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let json = r#"{"id":"x","p1":[0.0,0.0,0.03],"p2":[1.0,0.0,0.05],"direction":0}"#;
        assert!(serde_json::from_str::<LinearCushionSegment>(json).is_err());

        let json = r#"{"id":"x","p1":[0.0,0.0,0.03],"p2":[1.0,0.0,0.03],"direction":7}"#;
        assert!(serde_json::from_str::<LinearCushionSegment>(json).is_err());

        let json = r#"{"id":"x","p1":[0.0,0.0,0.03],"p2":[1.0,0.0,0.03],"direction":0}"#;
        let seg: LinearCushionSegment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.line(), (0.0, 1.0, 0.0));
    }

    #[test]
    fn test_pocket_table_layout() {
        let table = Table::pocket_table().unwrap();
        assert_eq!(table.linear_segments().len(), 18);
        assert_eq!(table.circular_segments().len(), 12);
        assert_eq!(table.pockets().len(), 6);
        for seg in table.linear_segments().values() {
            assert_eq!(seg.p1().z, seg.p2().z);
        }
    }

    #[test]
    fn test_billiard_table_layout() {
        let table = Table::billiard_table().unwrap();
        assert_eq!(table.linear_segments().len(), 4);
        assert!(table.circular_segments().is_empty());
        assert!(table.pockets().is_empty());
        assert_eq!(table.w, 1.525);
    }

    #[test]
    fn test_potting_points_face_the_cloth() {
        let table = Table::pocket_table().unwrap();
        let lb = table.pocket("lb").unwrap();
        assert!(lb.potting_point.x > lb.center.x);
        assert!(lb.potting_point.y > lb.center.y);
        let rc = table.pocket("rc").unwrap();
        assert!(rc.potting_point.x < rc.center.x);
        assert_eq!(rc.potting_point.y, rc.center.y);
    }

    #[test]
    fn test_duplicate_ids_fail() {
        let p = Pocket::new("lb", DVec3::ZERO, 0.06).unwrap();
        let pockets = vec![p.clone(), p];
        let table = Table::new(TableType::Pocket, 1.0, 2.0, Vec::new(), Vec::new(), pockets);
        assert!(matches!(table, Err(GeometryError::DuplicateId { .. })));
    }

    #[test]
    fn test_invalid_specs_fail() {
        let specs = TableSpecs { side_pocket_radius: -1.0, ..TableSpecs::pocket() };
        assert!(matches!(Table::from_specs(&specs), Err(GeometryError::InvalidSpecs(_))));
        let specs = TableSpecs { l: 0.0, ..TableSpecs::billiard() };
        assert!(Table::from_specs(&specs).is_err());
    }

    #[test]
    fn test_table_type_names() {
        for t in [TableType::Pocket, TableType::Snooker, TableType::Billiard] {
            assert_eq!(TableType::from_str(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_snooker_table_builds() {
        let table = Table::from_specs(&TableSpecs::snooker()).unwrap();
        assert_eq!(table.pockets().len(), 6);
    }
}
