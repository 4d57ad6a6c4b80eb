use crate::models::{Account, Attachment, QuoteData};
use super::currency::format_currency;

pub const EMPTY_PROMPT: &str = "Complete los detalles del presupuesto para ver la vista previa.";
pub const LOGO_PLACEHOLDER: &str = "Logo de la Empresa";
pub const VEHICLE_PLACEHOLDER: &str = "Foto del Vehículo";

/// Display-ready projection of a quote. Rendered to HTML for the screen and
/// to pixels for the PDF, so both always show the same thing.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLayout {
    pub logo: Option<Attachment>,
    pub body: PreviewBody,
    pub seller: Option<SellerFooter>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewBody {
    Placeholder(&'static str),
    Details(QuoteDetails),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDetails {
    pub vehicle: Option<Attachment>,
    pub vehicle_caption: String,
    pub brand: String,
    pub model: String,
    pub plan_name: String,
    pub plan_summary: String,
    pub rows: Vec<PlanRow>,
    pub total: PlanRow,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub label: &'static str,
    pub value: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub label: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SellerFooter {
    pub name: String,
    pub title: String,
    pub address: String,
    pub phone: String,
}

impl From<&Account> for SellerFooter {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            title: account.title.clone(),
            address: account.address.clone(),
            phone: account.phone.clone(),
        }
    }
}

/// Projects the quote, its images and the attributed seller into a layout.
/// Pure: the same inputs always give an equal layout.
pub fn render_preview(
    quote: &QuoteData,
    logo: Option<&Attachment>,
    vehicle: Option<&Attachment>,
    seller: Option<&Account>,
) -> QuoteLayout {
    let body = if quote.headline_is_empty() {
        PreviewBody::Placeholder(EMPTY_PROMPT)
    } else {
        PreviewBody::Details(details(quote, vehicle))
    };

    QuoteLayout {
        logo: logo.cloned(),
        body,
        seller: seller.map(SellerFooter::from),
    }
}

fn details(quote: &QuoteData, vehicle: Option<&Attachment>) -> QuoteDetails {
    let row = |label, raw: &str, highlighted| PlanRow {
        label,
        value: format_currency(raw),
        highlighted,
    };

    QuoteDetails {
        vehicle: vehicle.cloned(),
        vehicle_caption: format!("{} {}", quote.brand, quote.model),
        brand: quote.brand.to_uppercase(),
        model: quote.model.clone(),
        plan_name: quote.plan_name.clone(),
        plan_summary: format!("{} | {} Cuotas", quote.plan_type, quote.total_installments),
        rows: vec![
            row("Cuota 1", &quote.installment_1, false),
            row("Cuotas 2 a 12", &quote.installments_2_to_12, true),
            row("Cuotas 13 a 84", &quote.installments_13_to_84, false),
            row("Cuota Pura", &quote.pure_installment, true),
            row("Alicuota Extraordinaria (30%)", &quote.extraordinary_payment, false),
        ],
        total: row("Valor Total del Plan", &quote.total_plan_value, false),
        notes: vec![
            Note { label: "Adjudicación", text: quote.adjudication.clone() },
            Note { label: "Entrega asegurada por contrato", text: quote.guaranteed_delivery.clone() },
        ],
    }
}
