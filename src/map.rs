//! Map session: tile style and the single location marker
//!
//! The tile widget itself is out of scope; this is the state it is driven from.

use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Initial zoom level when a location is shown
pub const DEFAULT_ZOOM: u8 = 10;

/// Base layer of the map
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    #[default]
    Standard,
    Satellite,
}

impl MapStyle {
    /// Slippy-map URL template (`{s}` subdomain, `{z}` zoom, `{x}`/`{y}` tile)
    #[must_use]
    pub fn tile_url_template(self) -> &'static str {
        match self {
            MapStyle::Standard => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            MapStyle::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
        }
    }

    #[must_use]
    pub fn attribution(self) -> &'static str {
        match self {
            MapStyle::Standard => "© OpenStreetMap contributors",
            MapStyle::Satellite => {
                "Tiles © Esri, Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community"
            }
        }
    }

    /// Concrete tile URL; the standard layer always uses subdomain `a`
    #[must_use]
    pub fn tile_url(self, zoom: u8, x: u32, y: u32) -> String {
        self.tile_url_template()
            .replace("{s}", "a")
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapStyle::Standard => write!(f, "standard"),
            MapStyle::Satellite => write!(f, "satellite"),
        }
    }
}

impl FromStr for MapStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "street" | "osm" => Ok(MapStyle::Standard),
            "satellite" | "imagery" => Ok(MapStyle::Satellite),
            other => Err(format!(
                "Unknown map style '{other}'. Use 'standard' or 'satellite'"
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Marker {
    pub coordinates: Coordinates,
    /// Popup text, usually the location name
    pub label: String,
}

/// Slippy-map tile indices containing `coordinates` at `zoom`
#[must_use]
pub fn tile_for(coordinates: Coordinates, zoom: u8) -> (u32, u32) {
    let n = f64::from(1_u32 << zoom.min(31));
    // Web Mercator is undefined at the poles
    let lat = coordinates.latitude.clamp(-85.051_128_78, 85.051_128_78).to_radians();

    let x = ((coordinates.longitude + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - lat.tan().asinh() / std::f64::consts::PI) / 2.0 * n).floor();

    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

/// Map state owned by the session; holds at most one marker
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapSession {
    pub style: MapStyle,
    pub zoom: u8,
    pub marker: Option<Marker>,
}

impl Default for MapSession {
    fn default() -> Self {
        Self {
            style: MapStyle::default(),
            zoom: DEFAULT_ZOOM,
            marker: None,
        }
    }
}

impl MapSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Center on `coordinates` with a single marker, returning the marker it replaced
    pub fn place_marker(&mut self, coordinates: Coordinates, label: impl Into<String>) -> Option<Marker> {
        self.zoom = DEFAULT_ZOOM;
        self.marker.replace(Marker {
            coordinates,
            label: label.into(),
        })
    }

    /// Swap the base layer; the marker stays where it is
    pub fn set_style(&mut self, style: MapStyle) {
        self.style = style;
    }

    /// Tile under the marker in the current style
    #[must_use]
    pub fn center_tile_url(&self) -> Option<String> {
        self.marker.as_ref().map(|marker| {
            let (x, y) = tile_for(marker.coordinates, self.zoom);
            self.style.tile_url(self.zoom, x, y)
        })
    }

    /// OpenStreetMap link centered on the marker
    #[must_use]
    pub fn view_url(&self) -> Option<String> {
        self.marker.as_ref().map(|marker| {
            let Coordinates {
                latitude,
                longitude,
            } = marker.coordinates;
            format!(
                "https://www.openstreetmap.org/?mlat={latitude:.4}&mlon={longitude:.4}#map={}/{latitude:.4}/{longitude:.4}",
                self.zoom
            )
        })
    }
}
