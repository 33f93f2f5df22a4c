//! The server-rendered shell of the redirect list.
//!
//! The page embeds the bootstrap dataset as `data-*` attributes for the
//! client side list and renders the first page of redirects so the list
//! is readable without scripts.

use detour_admin::FlashMessage;
use detour_core::datetime::{format_readable, format_seconds};
use detour_core::host::display_host;
use detour_core::markup::{escape_html, highlight_escaped, shorten_path};
use detour_listing::{Bootstrap, ListAction, ListState};
use jiff::Timestamp;
use std::fmt::Write;

const MAX_PATH_LENGTH: usize = 60;

fn data_attribute<T: serde::Serialize>(name: &str, value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    format!(r#" data-{name}="{}""#, escape_html(&json))
}

fn render_messages(html: &mut String, messages: &[FlashMessage]) {
    if messages.is_empty() {
        return;
    }
    html.push_str("<ul class=\"flash-messages\">");
    for message in messages {
        // Message bodies are produced by the admin and already escaped.
        let _ = write!(
            html,
            "<li class=\"flash-message flash-message--{}\"><strong>{}</strong>{}</li>",
            message.severity.as_str().to_ascii_lowercase(),
            escape_html(&message.title),
            message.message,
        );
    }
    html.push_str("</ul>");
}

fn date_cell(timestamp: Option<Timestamp>) -> String {
    match timestamp {
        Some(timestamp) => format!(
            "<td title=\"{}\">{}</td>",
            format_seconds(timestamp),
            format_readable(timestamp)
        ),
        None => "<td></td>".to_string(),
    }
}

fn render_rows(html: &mut String, bootstrap: &Bootstrap, search: &str) {
    let mut state = ListState::from_bootstrap(bootstrap);
    if !search.trim().is_empty() {
        state.apply(ListAction::UpdateSearch(search.to_string()));
    }
    let keyword = state.search_value();
    let page = state.page();

    let filtered = if state.filter().is_active() {
        " redirects--filtered"
    } else {
        ""
    };

    if page.is_empty() {
        let _ = write!(html, "<p class=\"redirects-empty{filtered}\">No redirects</p>");
        return;
    }

    html.push_str(
        "<table class=\"redirects-table\"><thead><tr><th>Status</th><th>Host</th>\
         <th>Source</th><th>Target</th><th>Start</th><th>End</th><th>Comment</th>",
    );
    if bootstrap.show_hit_count {
        html.push_str("<th>Hits</th>");
    }
    html.push_str("</tr></thead><tbody>");

    for redirect in &page.redirects {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td title=\"{}\">{}</td><td title=\"{}\">{}</td>\
             {}{}<td>{}</td>",
            redirect.status_code,
            escape_html(display_host(redirect.host.as_ref())),
            escape_html(&redirect.source_uri_path),
            highlight_escaped(&shorten_path(&redirect.source_uri_path, MAX_PATH_LENGTH), keyword),
            escape_html(&redirect.target_uri_path),
            highlight_escaped(&shorten_path(&redirect.target_uri_path, MAX_PATH_LENGTH), keyword),
            date_cell(redirect.start_date_time),
            date_cell(redirect.end_date_time),
            highlight_escaped(redirect.comment.as_deref().unwrap_or_default(), keyword),
        );
        if bootstrap.show_hit_count {
            let _ = write!(html, "<td>{}</td>", redirect.hit_counter);
        }
        html.push_str("</tr>");
    }

    let _ = write!(
        html,
        "</tbody></table><p class=\"redirects-summary{filtered}\">Showing {}-{} of {}</p>",
        page.first, page.last, page.total
    );
}

/// Renders the index page, narrowing the first page to `search` and
/// highlighting it in the rows.
pub fn render_index(bootstrap: &Bootstrap, search: &str, messages: &[FlashMessage]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Redirects</title></head><body>",
    );
    render_messages(&mut html, messages);

    html.push_str("<div id=\"redirects\"");
    html.push_str(&data_attribute("redirects", &bootstrap.redirects));
    html.push_str(&data_attribute("actions", &bootstrap.actions));
    html.push_str(&data_attribute("status-codes", &bootstrap.status_codes));
    html.push_str(&data_attribute("host-options", &bootstrap.host_options));
    html.push_str(&data_attribute("csrf-token", &bootstrap.csrf_token));
    html.push_str(&data_attribute(
        "valid-source-uri-path-pattern",
        &bootstrap.valid_source_uri_path_pattern,
    ));
    html.push_str(&data_attribute(
        "default-status-code",
        &bootstrap.default_status_code,
    ));
    html.push_str(&data_attribute(
        "initial-status-code-filter",
        &bootstrap.initial_status_code_filter,
    ));
    html.push_str(&data_attribute(
        "initial-type-filter",
        &bootstrap.initial_type_filter,
    ));
    html.push_str(&data_attribute("show-hit-count", &bootstrap.show_hit_count));
    html.push_str(&data_attribute("initial-search", &search.trim()));
    html.push('>');

    render_rows(&mut html, bootstrap, search);
    html.push_str("</div></body></html>");
    html
}
