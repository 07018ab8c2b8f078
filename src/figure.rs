//! Figure description: layout chrome and trace assembly
//!
//! The renderable figure is a typed, serde-serializable subset of the plotly
//! figure schema: a `geo` layout block for the world map plus one
//! `choropleth` trace per legend band. Serialization produces exactly the
//! JSON an external plotly renderer consumes, so this module owns all field
//! naming; the renderer only ever sees [`Figure`] values.
//!
//! The layout is data-independent except for the year in the title. Traces
//! are ordered by band index; the renderer stacks colorbar segments by that
//! order, so [`assemble`] must never reorder its input.

use serde::Serialize;

use crate::bands::Band;
use crate::config::GeoBounds;
use crate::error::Result;

/// Map land fill, a muted teal that keeps the band colors readable.
const LAND_COLOR: &str = "rgb(15,105,105)";
/// Annotation text color
const ANNOTATION_COLOR: &str = "rgb(220,220,220)";
/// Fixed horizontal position of the colorbar stack
const COLORBAR_X: f64 = 0.9;

/// A complete renderable figure: one per year.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Choropleth>,
    pub layout: Layout,
}

/// One choropleth trace, drawing the member countries of a single band.
#[derive(Debug, Clone, Serialize)]
pub struct Choropleth {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    pub text: Vec<String>,
    /// Two-stop gradient covering the band's value range
    pub colorscale: Vec<(f64, String)>,
    pub zmin: f64,
    pub zmax: f64,
    pub colorbar: ColorBar,
}

/// Geometry of one colorbar segment in the stacked legend.
#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub x: f64,
    pub y: f64,
    pub ypad: f64,
    pub len: f64,
    pub tick0: f64,
    pub dtick: f64,
}

/// Static chrome for one year's map.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub geo: Geo,
    pub margin: Margin,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Geo {
    pub showframe: bool,
    pub projection: Projection,
    pub scope: &'static str,
    pub showsubunits: bool,
    pub resolution: u32,
    pub lonaxis: GeoAxis,
    pub lataxis: GeoAxis,
    pub showland: bool,
    pub landcolor: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoAxis {
    pub showgrid: bool,
    pub range: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
    pub pad: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub xref: &'static str,
    pub yref: &'static str,
    pub text: &'static str,
    pub font: AnnotationFont,
    pub showarrow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationFont {
    pub color: &'static str,
}

/// Build the static layout for one year.
///
/// Pure apart from bounds validation: non-increasing longitude or latitude
/// ranges fail with [`crate::error::ChoroplethError::InvalidRange`].
pub fn build_layout(year: &str, per_n_people: f64, bounds: &GeoBounds) -> Result<Layout> {
    bounds.validate()?;

    Ok(Layout {
        title: Title {
            text: format!("Refugees per {per_n_people} inhabitants in {year}"),
            font: Font { size: 32 },
        },
        geo: Geo {
            showframe: false,
            projection: Projection {
                kind: "natural earth",
            },
            scope: "world",
            showsubunits: true,
            resolution: 50,
            lonaxis: GeoAxis {
                showgrid: false,
                range: bounds.longitude,
            },
            lataxis: GeoAxis {
                showgrid: false,
                range: bounds.latitude,
            },
            showland: true,
            landcolor: LAND_COLOR,
        },
        margin: Margin {
            l: 5,
            r: 5,
            b: 1,
            t: 55,
            pad: 1,
        },
        annotations: vec![Annotation {
            x: 0.13,
            y: 0.002,
            xref: "paper",
            yref: "paper",
            text: "Source: World Bank",
            font: AnnotationFont {
                color: ANNOTATION_COLOR,
            },
            showarrow: false,
        }],
    })
}

/// Combine a year's bands with its layout into a figure.
///
/// Band order is preserved: trace i carries colorbar stack position i.
pub fn assemble(bands: &[Band], layout: Layout) -> Figure {
    let data = bands
        .iter()
        .map(|band| Choropleth {
            trace_type: "choropleth",
            locations: band.locations.clone(),
            z: band.values.clone(),
            text: band.names.clone(),
            colorscale: vec![
                (0.0, band.colors.0.clone()),
                (1.0, band.colors.1.clone()),
            ],
            zmin: band.range.0,
            zmax: band.range.1,
            colorbar: ColorBar {
                x: COLORBAR_X,
                y: band.colorbar_y(),
                ypad: 0.0,
                len: band.colorbar_len(),
                tick0: band.range.0,
                dtick: band.tick_spacing(),
            },
        })
        .collect();

    Figure { data, layout }
}
