use eventmap_core::popup::html_escape;

/// Render the viewer page: search form, category buttons, event list, counter
/// and map. All behavior lives server-side; the script only forwards DOM
/// events and applies the command batches it gets back.
pub fn render_viewer() -> String {
    let content = r#"
<div class="viewer">
    <aside class="sidebar">
        <form class="search-form" autocomplete="off">
            <input id="eventSearch" type="search" placeholder="Search events or categories">
        </form>
        <div class="card-action" id="categoryButtons"></div>
        <p class="counter"><span id="event-count">0</span> events</p>
        <ul class="collection" id="eventsList"></ul>
    </aside>
    <div id="map"></div>
</div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script>
let sessionId = null;
let map = null;
let markers = null;
const popups = new Map();

const list = document.getElementById('eventsList');
const buttons = document.getElementById('categoryButtons');
const counter = document.getElementById('event-count');
const search = document.getElementById('eventSearch');

function esc(s) {
    return String(s)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;')
        .replace(/'/g, '&#39;');
}

function row(id) {
    return document.getElementById(id);
}

const viewOps = {
    render_rows(c) {
        list.innerHTML = c.rows.map(r =>
            `<li class="collection-item ${r.color}" id="${esc(r.id)}">` +
            `<span class="collection-item-text">${esc(r.title)}</span>` +
            r.badges.map(b => `<span class="badge">${esc(b)}</span>`).join('') +
            `</li>`).join('');
    },
    render_buttons(c) {
        buttons.innerHTML = c.buttons.map(b => {
            const cls = b.id.endsWith('-all') ? 'all-btn' : 'filter-btn';
            return `<a class="btn ${cls} ${b.color}" id="${esc(b.id)}">${esc(b.label)}</a>`;
        }).join('');
    },
    set_row_visible(c) { const el = row(c.id); if (el) el.hidden = !c.visible; },
    set_row_active(c) { const el = row(c.id); if (el) el.classList.toggle('active', c.active); },
    scroll_to_row(c) { const el = row(c.id); if (el) list.scrollTop = el.offsetTop - list.offsetTop; },
    set_button_visible(c) { const el = row(c.button); if (el) el.hidden = !c.visible; },
    set_button_active(c) { const el = row(c.button); if (el) el.classList.toggle('lighten-3', !c.active); },
    set_count(c) { counter.textContent = c.count; },
    set_search_text(c) { search.value = c.text; },
};

const mapOps = {
    build(c) {
        const o = c.options;
        map = L.map('map', { minZoom: o.minZoom, maxZoom: o.maxZoom, worldCopyJump: true });
        L.tileLayer(o.tileUrl, {
            attribution: o.attribution,
            maxZoom: o.maxZoom,
            tileSize: o.tileSize,
            zoomOffset: o.zoomOffset,
        }).addTo(map);
        map.fitWorld();
        markers = L.layerGroup().addTo(map);
        map.on('popupopen', e => {
            const f = e.popup._eventFeature;
            if (f) send({ kind: 'popup_opened', properties: f.properties, geometry: f.geometry });
        });
    },
    add_marker(c) {
        const layer = L.geoJSON(c.feature, {
            pointToLayer: (_, latlng) => L.circleMarker(latlng, c.style),
            style: () => c.style,
        });
        const popup = L.popup().setContent(c.feature.properties.popupContent);
        popup._eventFeature = c.feature;
        layer.bindPopup(popup);
        markers.addLayer(layer);
        popups.set(c.popup, { layer, popup });
    },
    clear_markers() { markers.clearLayers(); popups.clear(); },
    fly_to(c) { map.flyTo([c.target.lat, c.target.lng], c.zoom); },
    open_popup(c) {
        const p = popups.get(c.popup);
        if (!p) return;
        const anchor = p.popup._eventFeature.geometry;
        const [lng, lat] = anchor.type === 'Point' ? anchor.coordinates : anchor.coordinates[0][0];
        p.popup.setLatLng([lat, lng]).openOn(map);
    },
};

function apply(batch) {
    (batch.view || []).forEach(c => viewOps[c.op] && viewOps[c.op](c));
    (batch.map || []).forEach(c => mapOps[c.op] && mapOps[c.op](c));
}

// One request in flight at a time; batches apply in the order the server produced them.
let queue = Promise.resolve();

function send(event) {
    if (!sessionId) return;
    queue = queue
        .then(() => fetch(`/api/sessions/${sessionId}/events`, {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify(event),
        }))
        .then(r => r.ok ? r.json() : null)
        .then(b => b && apply(b))
        .catch(() => {});
}

function target(el) {
    return {
        id: el.id || '',
        classes: Array.from(el.classList),
        parent_id: el.parentElement ? el.parentElement.id || null : null,
    };
}

document.querySelector('.search-form').addEventListener('submit', e => {
    e.preventDefault();
    send({ kind: 'search_submitted', query: search.value });
});
search.addEventListener('input', () => send({ kind: 'search_input', value: search.value }));
buttons.addEventListener('click', e => send({ kind: 'category_clicked', target: target(e.target) }));
list.addEventListener('click', e => send({ kind: 'list_clicked', target: target(e.target) }));
window.addEventListener('pagehide', () => {
    if (sessionId) navigator.sendBeacon(`/api/sessions/${sessionId}/close`);
});

fetch('/api/sessions', { method: 'POST' })
    .then(r => r.ok ? r.json() : Promise.reject(r.status))
    .then(b => { sessionId = b.session_id; apply(b); })
    .catch(() => {});
</script>
"#;

    build_page("Natural Events", content)
}

// --- Helpers ---

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | EONET Viewer</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.header h1{{font-size:18px;font-weight:600;}}
.viewer{{display:flex;height:calc(100vh - 46px);}}
.sidebar{{width:360px;display:flex;flex-direction:column;border-right:1px solid #ddd;background:#fff;}}
.search-form{{padding:12px;}}
.search-form input{{width:100%;padding:8px;border:1px solid #ccc;border-radius:4px;font-size:14px;}}
.card-action{{padding:0 12px 8px;display:flex;flex-wrap:wrap;gap:6px;}}
.btn{{padding:4px 10px;border-radius:4px;font-size:12px;color:#fff;cursor:pointer;}}
.btn.lighten-3{{opacity:0.45;}}
.counter{{padding:0 12px 8px;font-size:13px;color:#666;}}
.collection{{list-style:none;overflow-y:auto;flex:1;}}
.collection-item{{padding:10px 12px;border-left:4px solid transparent;border-bottom:1px solid #eee;cursor:pointer;}}
.collection-item.active{{background:#eef2ff;}}
.collection-item-text{{display:block;font-size:14px;margin-bottom:4px;}}
.badge{{display:inline-block;padding:2px 8px;margin-right:4px;border-radius:12px;font-size:11px;background:#f0f0f0;color:#555;}}
#map{{flex:1;}}
.pink{{background:#e91e63;border-left-color:#e91e63;}}
.red{{background:#f44336;border-left-color:#f44336;}}
.cyan{{background:#00bcd4;border-left-color:#00bcd4;}}
.orange{{background:#ff9800;border-left-color:#ff9800;}}
.indigo{{background:#3f51b5;border-left-color:#3f51b5;}}
.collection-item.pink,.collection-item.red,.collection-item.cyan,.collection-item.orange,.collection-item.indigo{{background:#fff;}}
.collection-item.active.pink,.collection-item.active.red,.collection-item.active.cyan,.collection-item.active.orange,.collection-item.active.indigo{{background:#eef2ff;}}
</style>
</head>
<body>
<div class="header">
    <h1>EONET Viewer</h1>
</div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}
