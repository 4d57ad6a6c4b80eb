//! HTML fragments for the pages. Templates live in `templates/` and carry
//! `{{placeholder}}` markers that are replaced with the fragments built here.

use crate::errors::{AppError, AppResult};
use crate::models::{Account, QuoteData, QuoteField, Role, View};
use crate::pipeline::preview::{
    PreviewBody, QuoteDetails, QuoteLayout, SellerFooter, LOGO_PLACEHOLDER, VEHICLE_PLACEHOLDER,
};

pub fn load_template(name: &str) -> AppResult<String> {
    std::fs::read_to_string(format!("templates/{}", name)).map_err(|e| {
        tracing::error!("Failed to read template {}: {}", name, e);
        AppError::File(e)
    })
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Inline script that raises a blocking notice, or nothing.
pub fn alert_script(message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => {
            let literal = serde_json::to_string(message)
                .unwrap_or_else(|_| "\"\"".to_string())
                .replace('<', "\\u003c");
            format!("<script>window.addEventListener('load', () => alert({}));</script>", literal)
        }
        _ => String::new(),
    }
}

pub fn inline_error(message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(
            r#"<p class="text-red-500 text-sm text-center">{}</p>"#,
            html_escape(message)
        ),
        _ => String::new(),
    }
}

pub fn header_bar(account: &Account) -> String {
    format!(
        r#"<header class="bg-gray-800 shadow-md">
  <div class="container mx-auto px-4 flex items-center justify-between h-16">
    <span class="font-bold text-xl text-yellow-400">QuoteGen Pro</span>
    <div class="flex items-center space-x-4">
      <span class="hidden sm:block">Bienvenido, {} ({})</span>
      <a href="/logout" class="p-2 rounded-full hover:bg-gray-700" aria-label="Cerrar Sesión">Salir</a>
    </div>
  </div>
</header>"#,
        html_escape(&account.name),
        account.role
    )
}

/// Role-gated side menu. Sellers get no menu at all.
pub fn menu(account: &Account, view: View) -> String {
    if account.role != Role::Admin {
        return String::new();
    }
    let item = |target: View, name: &str, label: &str| {
        let class = if target == view {
            "bg-yellow-500 text-gray-900"
        } else {
            "text-gray-300 hover:bg-gray-700"
        };
        format!(
            r#"<a href="/view/{}" class="block mt-2 p-2 md:px-4 rounded-md text-sm font-medium {}">{}</a>"#,
            name, class, label
        )
    };
    format!(
        r#"<nav class="bg-gray-800 w-16 md:w-56 p-2 md:p-4 flex flex-col">{}{}</nav>"#,
        item(View::Quotes, "quotes", "Presupuestos"),
        item(View::Admin, "admin", "Panel de Admin")
    )
}

pub fn field_inputs(quote: &QuoteData) -> String {
    QuoteField::ALL
        .iter()
        .map(|field| {
            format!(
                r#"<div>
  <label for="{key}" class="block text-sm font-medium text-gray-400">{label}</label>
  <input type="text" id="{key}" name="{key}" value="{value}" class="mt-1 block w-full bg-gray-700 border border-gray-600 rounded-md py-2 px-3 text-white sm:text-sm">
</div>"#,
                key = field.key(),
                label = html_escape(field.label()),
                value = html_escape(quote.get(*field)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn seller_options(options: &[Account], active: &Account, selected: Option<&str>) -> String {
    options
        .iter()
        .map(|account| {
            let label = if account.id == active.id && account.is_admin() {
                format!("{} (Admin)", account.name)
            } else {
                account.name.clone()
            };
            let chosen = if Some(account.id.as_str()) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                html_escape(&account.id),
                chosen,
                html_escape(&label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn account_rows(accounts: &[Account]) -> String {
    accounts
        .iter()
        .map(|account| {
            format!(
                r#"<tr class="border-b border-gray-700 hover:bg-gray-700/50">
  <td class="p-3">{}</td>
  <td class="p-3">{}</td>
  <td class="p-3 capitalize">{}</td>
  <td class="p-3">{}</td>
</tr>"#,
                html_escape(&account.name),
                html_escape(&account.username),
                account.role,
                html_escape(&account.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The preview card. Also the region the PDF export captures.
pub fn preview(layout: &QuoteLayout) -> String {
    let logo = match &layout.logo {
        Some(logo) => format!(
            r#"<img src="{}" alt="Company Logo" class="max-h-full max-w-xs object-contain">"#,
            logo.data_uri()
        ),
        None => format!(
            r#"<div class="w-full h-full border-2 border-dashed border-gray-600 flex items-center justify-center rounded"><span class="text-gray-400 text-lg">{}</span></div>"#,
            LOGO_PLACEHOLDER
        ),
    };

    let body = match &layout.body {
        PreviewBody::Placeholder(prompt) => format!(
            r#"<div class="text-center text-gray-500 py-20"><p>{}</p></div>"#,
            html_escape(prompt)
        ),
        PreviewBody::Details(details) => preview_details(details),
    };

    let footer = layout.seller.as_ref().map(seller_footer).unwrap_or_default();

    format!(
        r#"<div id="quote-preview" class="bg-[#0a0f1e] text-black w-full max-w-2xl mx-auto p-4 sm:p-8 shadow-2xl rounded-lg">
<div class="bg-white rounded-md overflow-hidden">
<header class="bg-gray-900 p-6 sm:p-10 flex justify-center items-center h-40">{}</header>
<main class="p-6 sm:p-10">{}{}</main>
</div>
</div>"#,
        logo, body, footer
    )
}

fn preview_details(details: &QuoteDetails) -> String {
    let photo = match &details.vehicle {
        Some(vehicle) => format!(
            r#"<img src="{}" alt="{}" class="w-full h-full object-cover rounded-lg">"#,
            vehicle.data_uri(),
            html_escape(&details.vehicle_caption)
        ),
        None => format!(r#"<span class="text-gray-500">{}</span>"#, VEHICLE_PLACEHOLDER),
    };

    let row = |label: &str, value: &str, highlighted: bool, total: bool| {
        format!(
            r#"<div class="flex justify-between items-center py-3 px-4{}{}"><p class="text-sm{} text-gray-600">{}</p><p class="font-semibold {} text-right">{}</p></div>"#,
            if highlighted { " bg-gray-50" } else { "" },
            if total { " border-t-2 border-gray-300" } else { " border-b border-gray-200" },
            if total { " font-bold" } else { "" },
            html_escape(label),
            if total { "text-xl text-black" } else { "text-gray-800" },
            html_escape(value)
        )
    };
    let rows: String = details
        .rows
        .iter()
        .map(|r| row(r.label, &r.value, r.highlighted, false))
        .collect();
    let total = row(details.total.label, &details.total.value, false, true);

    let notes: String = details
        .notes
        .iter()
        .map(|note| {
            format!(
                r#"<p><span class="font-semibold">{}:</span> {}</p>"#,
                html_escape(note.label),
                html_escape(&note.text)
            )
        })
        .collect();

    format!(
        r#"<div class="space-y-8">
<section class="grid grid-cols-1 md:grid-cols-2 gap-8 items-center">
  <div class="w-full h-48 md:h-full bg-gray-200 rounded-lg flex items-center justify-center">{photo}</div>
  <div class="text-center md:text-left">
    <p class="text-sm font-semibold text-yellow-600">{brand}</p>
    <h1 class="text-3xl md:text-4xl font-bold text-gray-900">{model}</h1>
    <p class="mt-2 text-gray-600">{plan_name}</p>
    <p class="text-sm text-gray-500">{summary}</p>
  </div>
</section>
<section class="border border-gray-200 rounded-lg overflow-hidden">
  <h2 class="text-lg font-bold text-gray-800 bg-gray-50 p-4 border-b border-gray-200">Detalles del Plan</h2>
  <div class="divide-y divide-gray-200">{rows}</div>
  <div class="bg-gray-50">{total}</div>
</section>
<section class="text-center text-xs text-gray-500 space-y-1">{notes}</section>
</div>"#,
        photo = photo,
        brand = html_escape(&details.brand),
        model = html_escape(&details.model),
        plan_name = html_escape(&details.plan_name),
        summary = html_escape(&details.plan_summary),
        rows = rows,
        total = total,
        notes = notes,
    )
}

fn seller_footer(seller: &SellerFooter) -> String {
    format!(
        r#"<footer class="text-center mt-12 pt-6 border-t-2 border-gray-200 space-y-1">
<p class="font-bold text-lg text-gray-800">{}</p>
<p class="text-sm text-gray-600">{}</p>
<p class="text-sm text-gray-500">{}</p>
<p class="text-sm text-gray-500">{}</p>
</footer>"#,
        html_escape(&seller.name),
        html_escape(&seller.title),
        html_escape(&seller.address),
        html_escape(&seller.phone)
    )
}
