//! Figure rendering: interactive HTML and still-image export
//!
//! Rendering proper is delegated: the HTML path embeds the figure JSON in a
//! page that loads plotly.js from CDN and lets the browser draw it, and the
//! image path hands the same JSON to an external `orca` process. Both paths
//! are fed from the serialized [`Figure`](crate::figure::Figure), so a given
//! figure always produces byte-identical output.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::{ChoroplethError, Result};
use crate::figure::Figure;

/// Exported image resolution
pub const IMAGE_WIDTH: u32 = 1920;
pub const IMAGE_HEIGHT: u32 = 1080;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";

/// Write a self-contained HTML page for the figure.
///
/// The same path is rewritten on every iteration of the year loop; an open
/// browser tab only has to refresh to show the next year.
pub fn write_html(figure: &Figure, path: &Path) -> Result<()> {
    let json = serde_json::to_string(figure)?;
    let page = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\"/>\n\
         <script src=\"{PLOTLY_CDN}\"></script>\n\
         </head>\n\
         <body>\n\
         <div id=\"plot\" style=\"width:100%;height:100vh;\"></div>\n\
         <script>\n\
         var figure = {json};\n\
         Plotly.newPlot(\"plot\", figure.data, figure.layout);\n\
         </script>\n\
         </body>\n\
         </html>\n"
    );
    fs::write(path, page)?;
    tracing::debug!(path = %path.display(), "wrote HTML figure");
    Ok(())
}

/// Export the figure as a JPEG via the external `orca` executable.
///
/// The figure JSON goes to a temp file, orca renders it at the fixed
/// 1920x1080 resolution, and the temp file is removed afterwards. A missing
/// executable or a non-zero exit becomes a render error carrying orca's
/// stderr.
pub fn export_image(figure: &Figure, out_path: &Path, orca_executable: &Path) -> Result<()> {
    let stem = out_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "figure".to_string());
    let json_path = std::env::temp_dir().join(format!("choropleth_{stem}.json"));
    fs::write(&json_path, serde_json::to_vec(figure)?)?;

    let output = Command::new(orca_executable)
        .arg("graph")
        .arg(&json_path)
        .arg("-o")
        .arg(out_path)
        .arg("--format")
        .arg("jpeg")
        .arg("--width")
        .arg(IMAGE_WIDTH.to_string())
        .arg("--height")
        .arg(IMAGE_HEIGHT.to_string())
        .output();

    // Best effort: the temp file is not needed whatever orca did.
    let _ = fs::remove_file(&json_path);

    let output = output.map_err(|e| ChoroplethError::Render {
        path: out_path.to_path_buf(),
        reason: format!("failed to launch '{}': {e}", orca_executable.display()),
    })?;

    if !output.status.success() {
        return Err(ChoroplethError::Render {
            path: out_path.to_path_buf(),
            reason: format!(
                "exporter exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    tracing::debug!(path = %out_path.display(), "exported image");
    Ok(())
}
