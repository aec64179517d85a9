use std::collections::HashMap;

use axum::extract::Multipart;
use carlot_domains::uploads::UploadedFile;
use carlot_domains::CatalogError;

/// A parsed multipart form: text fields by name plus the files sent under
/// any of the accepted file field names.
#[derive(Debug, Default)]
pub struct Form {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl Form {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text fields as a JSON object, for deserializing into typed inputs.
    pub fn fields_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Drain a multipart body. Files beyond `max_files` are rejected rather
/// than silently dropped. Empty file parts (a form submitted with no file
/// chosen) are skipped.
pub async fn read_form(
    mut multipart: Multipart,
    file_fields: &[&str],
    max_files: usize,
) -> Result<Form, CatalogError> {
    let mut form = Form::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CatalogError::validation(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if file_fields.contains(&name.as_str()) {
            let original = field.file_name().unwrap_or("image").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| CatalogError::validation(format!("Malformed form data: {e}")))?;
            if bytes.is_empty() {
                continue;
            }
            if form.files.len() >= max_files {
                return Err(CatalogError::validation(format!(
                    "At most {max_files} images can be uploaded"
                )));
            }
            form.files.push(UploadedFile::new(original, bytes));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| CatalogError::validation(format!("Malformed form data: {e}")))?;
            form.fields.insert(name, value);
        }
    }

    tracing::debug!(
        fields = form.fields.len(),
        files = form.files.len(),
        "Parsed multipart form"
    );
    Ok(form)
}
