//! Monthly report image downloader.
//!
//! Fills the image directory with one `YYYY_MM.png` frame per month, taken
//! from the Berkeley Earth monthly temperature update posts: the first large
//! figure after the "Spatial Variation" heading. The `fetch` subcommand
//! regenerates `frames.json` afterwards.
//!
//! Months that fail (missing post, no map, download error) are logged and
//! skipped; the rest of the range still runs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::Datelike;
use log::{debug, info, warn};
use regex::Regex;

use crate::config::FRAME_EXT;

/// Site hosting the monthly posts
pub const REPORT_BASE_URL: &str = "https://berkeleyearth.org/";

/// Heading that precedes the map figure
const MAP_HEADING: &str = "Spatial Variation";

// The site rejects unknown clients
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Calendar month, written `MM/YYYY` on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("Month must be 1-12: {}", month));
        }
        Ok(Self { year, month })
    }

    /// Month of the local clock
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self { year: now.year(), month: now.month() }
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    fn name(self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Frame file name, sorts chronologically: `2020_01.png`
    pub fn file_name(self) -> String {
        format!("{}_{:02}.{}", self.year, self.month, FRAME_EXT)
    }

    /// Post URL: `<base>/january-2020-temperature-update/`
    pub fn report_url(self, base: &str) -> String {
        format!(
            "{}/{}-{}-temperature-update/",
            base.trim_end_matches('/'),
            self.name(),
            self.year
        )
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, year) = s
            .split_once('/')
            .ok_or_else(|| format!("Expected MM/YYYY, got {:?}", s))?;
        let month = month
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid month: {:?}", month))?;
        let year = year
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid year: {:?}", year))?;
        Self::new(year, month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Every month from `start` to `end` inclusive (empty if `start > end`)
pub fn months(start: Month, end: Month) -> Vec<Month> {
    let mut out = Vec::new();
    let mut month = start;
    while month <= end {
        out.push(month);
        month = month.succ();
    }
    out
}

/// Absolute URL of the map image in a report page, if the page has one.
///
/// The map is the first `figure.wp-block-image.size-large` after the `<h2>`
/// mentioning "Spatial Variation".
pub fn find_map_image(html: &str) -> Result<Option<String>> {
    let heading = Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2>")?;
    let figure = Regex::new(r"(?is)<figure\b([^>]*)>(.*?)</figure>")?;
    let class_attr = Regex::new(r#"(?i)\bclass\s*=\s*["']([^"']*)["']"#)?;
    let img_src = Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#)?;

    let Some(after_heading) = heading
        .captures_iter(html)
        .find(|caps| caps[1].contains(MAP_HEADING))
        .and_then(|caps| caps.get(0))
        .map(|m| m.end())
    else {
        debug!("No {:?} heading", MAP_HEADING);
        return Ok(None);
    };

    let map_figure = figure.captures_iter(&html[after_heading..]).find(|caps| {
        class_attr.captures(&caps[1]).is_some_and(|class| {
            let classes: Vec<&str> = class[1].split_whitespace().collect();
            classes.contains(&"wp-block-image") && classes.contains(&"size-large")
        })
    });
    let Some(map_figure) = map_figure else {
        debug!("No large figure after {:?}", MAP_HEADING);
        return Ok(None);
    };

    let src = img_src
        .captures(&map_figure[2])
        .map(|caps| caps[1].to_string());
    match src {
        Some(src) if src.starts_with("http") => Ok(Some(src)),
        Some(src) => {
            debug!("Map image src is not a URL: {}", src);
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Download one month's map into `out_dir`. `Ok(None)` when the post or its
/// map is missing.
fn fetch_month(
    client: &reqwest::blocking::Client,
    base: &str,
    month: Month,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    let url = month.report_url(base);
    info!("Fetching {}", url);

    let response = client
        .get(&url)
        .send()
        .with_context(|| format!("Request to {} failed", url))?;
    if !response.status().is_success() {
        warn!("{} returned HTTP {}", url, response.status());
        return Ok(None);
    }
    let html = response
        .text()
        .with_context(|| format!("Failed to read {}", url))?;

    let Some(src) = find_map_image(&html)? else {
        warn!("No map image in {}", url);
        return Ok(None);
    };

    let path = out_dir.join(month.file_name());
    debug!("Downloading {} -> {}", src, path.display());
    let image = client
        .get(&src)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .with_context(|| format!("Failed to download {}", src))?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    std::fs::write(&path, &image)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(Some(path))
}

/// Download the maps for `start..=end` into `out_dir`. Returns the saved files.
pub fn fetch_months(base: &str, start: Month, end: Month, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if start > end {
        bail!("Start month {} is after end month {}", start, end);
    }

    let client = reqwest::blocking::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    info!("Fetching maps from {} to {}", start, end);
    let mut saved = Vec::new();
    for month in months(start, end) {
        match fetch_month(&client, base, month, out_dir) {
            Ok(Some(path)) => saved.push(path),
            Ok(None) => {}
            Err(e) => warn!("Skipping {}: {:#}", month, e),
        }
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rouille::Response;
    use tempfile::tempdir;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn report_page(map_src: &str) -> String {
        format!(
            r#"<html><body>
            <figure class="wp-block-image size-large"><img src="http://example.com/banner.png"></figure>
            <h2 class="wp-block-heading"><strong>Spatial Variation</strong></h2>
            <p>Text.</p>
            <figure class="wp-block-image size-medium"><img src="http://example.com/small.png"></figure>
            <figure class="wp-block-image size-large"><img decoding="async" src="{}" alt=""></figure>
            </body></html>"#,
            map_src
        )
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(month("01/2020"), Month::new(2020, 1).unwrap());
        assert_eq!(month("12/1999").to_string(), "12/1999");
        assert!("13/2020".parse::<Month>().is_err());
        assert!("0/2020".parse::<Month>().is_err());
        assert!("2020".parse::<Month>().is_err());
        assert!("jan/2020".parse::<Month>().is_err());
    }

    #[test]
    fn test_months_cross_year() {
        let range = months(month("11/2019"), month("02/2020"));
        let names: Vec<String> = range.iter().map(|m| m.file_name()).collect();
        assert_eq!(names, ["2019_11.png", "2019_12.png", "2020_01.png", "2020_02.png"]);
        assert!(months(month("02/2020"), month("01/2020")).is_empty());
    }

    #[test]
    fn test_report_url() {
        assert_eq!(
            month("03/2021").report_url(REPORT_BASE_URL),
            "https://berkeleyearth.org/march-2021-temperature-update/"
        );
    }

    #[test]
    fn test_find_map_image_after_heading() {
        let html = report_page("https://example.com/map.png");
        assert_eq!(
            find_map_image(&html).unwrap(),
            Some("https://example.com/map.png".to_string())
        );
    }

    #[test]
    fn test_find_map_image_missing() {
        let no_heading = r#"<h2>Other</h2>
            <figure class="wp-block-image size-large"><img src="http://x/a.png"></figure>"#;
        assert_eq!(find_map_image(no_heading).unwrap(), None);
        assert_eq!(find_map_image(&report_page("/relative/map.png")).unwrap(), None);
    }

    #[test]
    fn test_fetch_months_saves_found_maps() {
        let server = rouille::Server::new("127.0.0.1:0", |request| {
            let host = request.header("Host").unwrap_or_default().to_string();
            match request.url().as_str() {
                "/january-2020-temperature-update/" => {
                    Response::html(report_page(&format!("http://{}/maps/2020-01.png", host)))
                }
                "/maps/2020-01.png" => Response::from_data("image/png", b"PNG-1".to_vec()),
                _ => Response::empty_404(),
            }
        })
        .expect("failed to bind test server");
        let base = format!("http://{}", server.server_addr());
        let (_handle, stop) = server.stoppable();

        let dir = tempdir().expect("failed to create temp dir");
        let out_dir = dir.path().join("img");
        let saved = fetch_months(&base, month("01/2020"), month("02/2020"), &out_dir);
        let _ = stop.send(());

        assert_eq!(saved.unwrap(), vec![out_dir.join("2020_01.png")]);
        assert_eq!(std::fs::read(out_dir.join("2020_01.png")).unwrap(), b"PNG-1");
        assert!(!out_dir.join("2020_02.png").exists());
    }

    #[test]
    fn test_fetch_months_rejects_reversed_range() {
        let dir = tempdir().expect("failed to create temp dir");
        assert!(fetch_months(REPORT_BASE_URL, month("02/2020"), month("01/2020"), dir.path()).is_err());
    }
}
