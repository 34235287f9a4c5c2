use eventmap_common::Event;

const DATE_FORMAT: &str = "%b %-d, %Y";

/// Markup shown inside a marker's popup: title, primary category, and the
/// first and latest observation dates.
pub fn popup_html(event: &Event) -> String {
    let category = event
        .primary_category()
        .map(|c| c.title.as_str())
        .unwrap_or("Uncategorized");
    let start = event
        .first_geometry()
        .map(|g| g.date.format(DATE_FORMAT).to_string())
        .unwrap_or_default();
    let end = event
        .last_geometry()
        .map(|g| g.date.format(DATE_FORMAT).to_string())
        .unwrap_or_default();

    format!(
        r#"<div class="card-content">
    <h6>{title}</h6>
    <p>{category}</p>
</div>
<hr>
<div class="card-action">
    <span><b>Start date: </b> {start}</span><br>
    <span><b>Last update: </b> {end}</span>
</div>"#,
        title = html_escape(&event.title),
        category = html_escape(category),
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event_with;
    use chrono::{TimeZone, Utc};
    use eventmap_common::{Geometry, LngLat};

    #[test]
    fn popup_shows_first_and_last_dates() {
        let mut event = event_with("EONET_1", "Storm Alpha", &[("10", "Severe Storms")], (1.0, 2.0));
        event.geometries = vec![
            Geometry::point(Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap(), LngLat::new(1.0, 2.0)),
            Geometry::point(Utc.with_ymd_and_hms(2020, 6, 14, 6, 0, 0).unwrap(), LngLat::new(3.0, 4.0)),
        ];

        let html = popup_html(&event);
        assert!(html.contains("<h6>Storm Alpha</h6>"));
        assert!(html.contains("<p>Severe Storms</p>"));
        assert!(html.contains("Start date: </b> Jun 1, 2020"));
        assert!(html.contains("Last update: </b> Jun 14, 2020"));
    }

    #[test]
    fn popup_escapes_title() {
        let event = event_with("EONET_2", "Fire <script>", &[], (0.0, 0.0));
        let html = popup_html(&event);
        assert!(html.contains("Fire &lt;script&gt;"));
        assert!(html.contains("<p>Uncategorized</p>"));
    }
}
