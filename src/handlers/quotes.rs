use axum::{
    extract::{Form, Multipart, Query, State},
    response::{Html, IntoResponse, Response, Redirect},
    http::{StatusCode, header},
    body::Body,
};
use bytes::Bytes;
use std::collections::HashMap;
use tower_sessions::Session;
use crate::errors::{AppError, AppResult, ExportError, ImportError};
use crate::models::{Attachment, QuoteData, QuoteField, SellerForm, UploadSlot, Workspace};
use crate::pipeline::{can_export, export_blockers, export_filename, importer, render_preview, QuoteLayout};
use crate::state::AppState;
use super::{active_user, pages, ActiveUser, PageQuery};

// A file picked in one of the upload inputs
struct Upload {
    filename: Option<String>,
    bytes: Bytes,
}

pub async fn serve_workspace(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;
    let workspace = current_workspace(&state, &active).await?;
    tracing::debug!("Rendering workspace {} for {}", active.workspace_id, active.account.username);

    let layout = workspace_layout(&state, &active, &workspace).await;
    let options = state.identity.seller_options(&active.account).await;
    let blockers = export_blockers(&workspace);

    let spreadsheet_name = workspace
        .spreadsheet_name
        .as_deref()
        .map(|name| format!(
            r#"<p class="text-sm text-green-400 mt-2">Archivo cargado: {}</p>"#,
            pages::html_escape(name)
        ))
        .unwrap_or_default();
    let export_hint = if blockers.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="text-xs text-gray-400 mt-2">Para descargar: {}.</p>"#,
            pages::html_escape(&blockers.join(", "))
        )
    };

    let html = pages::load_template("quotes.html")?
        .replace("{{header}}", &pages::header_bar(&active.account))
        .replace("{{menu}}", &pages::menu(&active.account, active.session_state.view))
        .replace("{{spreadsheet_name}}", &spreadsheet_name)
        .replace("{{seller_options}}", &pages::seller_options(&options, &active.account, workspace.seller_id.as_deref()))
        .replace("{{fields}}", &pages::field_inputs(&workspace.quote))
        .replace("{{export_disabled}}", if blockers.is_empty() { "" } else { "disabled" })
        .replace("{{export_hint}}", &export_hint)
        .replace("{{preview}}", &pages::preview(&layout))
        .replace("{{alert}}", &pages::alert_script(query.alert.as_deref()));

    Ok(Html(html).into_response())
}

/// The preview card alone, for clients that refresh it in place.
pub async fn serve_preview(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;
    let workspace = current_workspace(&state, &active).await?;
    let layout = workspace_layout(&state, &active, &workspace).await;
    Ok(Html(pages::preview(&layout)).into_response())
}

pub async fn upload_logo(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    upload_image(state, session, multipart, UploadSlot::Logo).await
}

pub async fn upload_vehicle(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    upload_image(state, session, multipart, UploadSlot::Vehicle).await
}

async fn upload_image(
    state: AppState,
    session: Session,
    mut multipart: Multipart,
    slot: UploadSlot,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;
    let ticket = begin_upload(&state, &active, slot).await?;

    let attachment = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => Attachment::from_image_bytes(upload.bytes)
            .ok_or_else(|| AppError::Upload(format!("{:?} upload is not a recognised image", slot))),
        Ok(None) => {
            state.workspaces.cancel_upload(&active.workspace_id, slot, ticket).await;
            return Ok(Redirect::to("/quotes").into_response());
        }
        Err(e) => Err(e),
    };
    // A rejected file must not make an earlier upload of the same slot stale
    let attachment = match attachment {
        Ok(attachment) => attachment,
        Err(e) => {
            state.workspaces.cancel_upload(&active.workspace_id, slot, ticket).await;
            return Err(e);
        }
    };
    tracing::debug!("Received {:?} image ({}, {} bytes)", slot, attachment.mime, attachment.bytes.len());

    state
        .workspaces
        .finish_upload(&active.workspace_id, slot, ticket, move |workspace| match slot {
            UploadSlot::Logo => workspace.logo = Some(attachment),
            _ => workspace.vehicle = Some(attachment),
        })
        .await;

    Ok(Redirect::to("/quotes").into_response())
}

pub async fn upload_spreadsheet(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;
    let ticket = begin_upload(&state, &active, UploadSlot::Spreadsheet).await?;

    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            state.workspaces.cancel_upload(&active.workspace_id, UploadSlot::Spreadsheet, ticket).await;
            return Ok(Redirect::to("/quotes").into_response());
        }
        Err(e) => {
            state.workspaces.cancel_upload(&active.workspace_id, UploadSlot::Spreadsheet, ticket).await;
            return Err(ImportError::Unreadable(e.to_string()).into());
        }
    };
    let filename = upload.filename.unwrap_or_else(|| "planilla".to_string());
    tracing::info!("Importing spreadsheet {} ({} bytes)", filename, upload.bytes.len());

    let bytes = upload.bytes.to_vec();
    let imported = tokio::task::spawn_blocking(move || importer::import_workbook(bytes))
        .await
        .unwrap_or_else(|join_error| Err(ImportError::TaskPanic(join_error.to_string())));

    match imported {
        Ok(quote) => {
            state
                .workspaces
                .finish_upload(&active.workspace_id, UploadSlot::Spreadsheet, ticket, move |workspace| {
                    workspace.quote = quote;
                    workspace.spreadsheet_name = Some(filename);
                })
                .await;
            Ok(Redirect::to("/quotes").into_response())
        }
        Err(e) => {
            // A failed import leaves an empty quote rather than half of the old one,
            // labelled with the file that was just chosen
            state
                .workspaces
                .finish_upload(&active.workspace_id, UploadSlot::Spreadsheet, ticket, move |workspace| {
                    workspace.quote = QuoteData::default();
                    workspace.spreadsheet_name = Some(filename);
                })
                .await;
            Err(e.into())
        }
    }
}

pub async fn update_details(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;

    let mut edits = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        match QuoteField::from_key(&key) {
            Some(field) => edits.push((field, value)),
            None => tracing::warn!("Unexpected form field: {}", key),
        }
    }

    state
        .workspaces
        .update(&active.workspace_id, |workspace| {
            for (field, value) in edits {
                workspace.quote.set(field, value);
            }
        })
        .await;

    Ok(Redirect::to("/quotes").into_response())
}

pub async fn select_seller(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SellerForm>,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;

    if !state.identity.may_present_as(&active.account, &form.seller_id).await {
        tracing::warn!("Account {} may not present as {}", active.account.username, form.seller_id);
        return Err(AppError::Forbidden("No puede asignar ese vendedor.".into()));
    }

    state
        .workspaces
        .update(&active.workspace_id, |workspace| workspace.seller_id = Some(form.seller_id))
        .await;

    Ok(Redirect::to("/quotes").into_response())
}

pub async fn reset_workspace(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;
    state.workspaces.update(&active.workspace_id, Workspace::reset).await;
    Ok(Redirect::to("/quotes").into_response())
}

pub async fn export_pdf(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let active = active_user(&state, &session).await?;
    let workspace = current_workspace(&state, &active).await?;

    if !can_export(&workspace) {
        return Err(AppError::NotReady(export_blockers(&workspace).join(", ")));
    }

    let layout = workspace_layout(&state, &active, &workspace).await;
    let filename = export_filename(&workspace.quote.brand, &workspace.quote.model);
    tracing::info!("Exporting {} for {}", filename, active.account.username);

    let pdf = state.exporter.export(layout, filename.clone()).await?;
    let length = pdf.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .header(header::CONTENT_LENGTH, length.to_string())
        .body(Body::from(pdf))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            AppError::Export(ExportError::Pdf(format!("Failed to build download response: {}", e)))
        })
}

async fn current_workspace(state: &AppState, active: &ActiveUser) -> AppResult<Workspace> {
    state
        .workspaces
        .get(&active.workspace_id)
        .await
        .ok_or_else(|| AppError::Auth("Workspace expired".into()))
}

async fn begin_upload(state: &AppState, active: &ActiveUser, slot: UploadSlot) -> AppResult<u64> {
    state
        .workspaces
        .begin_upload(&active.workspace_id, slot)
        .await
        .ok_or_else(|| AppError::Auth("Workspace expired".into()))
}

/// Projects the workspace with its chosen seller, if the active account may
/// still present as that seller.
async fn workspace_layout(state: &AppState, active: &ActiveUser, workspace: &Workspace) -> QuoteLayout {
    let seller = match workspace.seller_id.as_deref() {
        Some(id) if state.identity.may_present_as(&active.account, id).await => state.accounts.get(id).await,
        _ => None,
    };
    render_preview(&workspace.quote, workspace.logo.as_ref(), workspace.vehicle.as_ref(), seller.as_ref())
}

// Reads the `file` field of an upload form. An empty file input yields `None`.
async fn read_upload(multipart: &mut Multipart) -> AppResult<Option<Upload>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field from multipart form: {}", e);
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(format!("Failed to read uploaded file: {}", e)))?;
                if bytes.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Upload { filename, bytes }));
            }
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }
    Ok(None)
}

// Header value safe for any brand/model text, with the exact name in `filename*`.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
