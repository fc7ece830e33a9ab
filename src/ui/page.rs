//! Full page: upload surface, prompt and trigger, result surface.
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::state::{Orchestrator, DEFAULT_PROMPT};
use super::result::ResultView;
use super::upload::{self, ACCEPTED_MIME_TYPES};

const REFRESH_SECONDS: u32 = 2;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
main { display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; }
.upload { display: block; border: 2px dashed #999; border-radius: 12px; padding: 2rem; text-align: center; cursor: pointer; position: relative; }
.upload.dragging { border-color: #3b82f6; background: #eff6ff; }
.preview img, .result img { max-width: 100%; border-radius: 8px; }
.preview .remove { position: absolute; top: .5rem; right: .5rem; }
.result { min-height: 240px; border: 1px solid #ddd; border-radius: 12px; padding: 1rem; text-align: center; }
.result.error { border-color: #dc2626; color: #991b1b; background: #fef2f2; }
form.trigger { margin-top: 1rem; display: flex; flex-direction: column; gap: .5rem; }
"#;

/// Client-side glue: first file only, type check with a blocking alert, then
/// a multipart POST to `/upload`. The typed prompt travels with uploads and
/// resets so the re-rendered page keeps it.
fn upload_script() -> String {
    let accepted = ACCEPTED_MIME_TYPES
        .iter()
        .map(|m| format!("'{}'", m))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"
const ACCEPTED = [{accepted}];
const promptBox = document.getElementById('prompt');
async function sendFile(files) {{
  if (!files || files.length === 0) return;
  const file = files[0];
  if (!ACCEPTED.includes(file.type)) {{
    alert('Please upload a PNG, JPEG, or WEBP image.');
    return;
  }}
  const body = new FormData();
  body.append('image', file);
  body.append('prompt', promptBox.value);
  const resp = await fetch('/upload', {{ method: 'POST', body }});
  if (!resp.ok) {{
    alert(await resp.text());
    return;
  }}
  window.location.reload();
}}
const removeForm = document.getElementById('remove-form');
if (removeForm) removeForm.addEventListener('submit', () => {{
  document.getElementById('reset-prompt').value = promptBox.value;
}});
const input = document.getElementById('file-input');
if (input) input.addEventListener('change', e => sendFile(e.target.files));
const zone = document.getElementById('dropzone');
if (zone) {{
  zone.addEventListener('dragover', e => {{ e.preventDefault(); zone.classList.add('dragging'); }});
  zone.addEventListener('dragleave', () => zone.classList.remove('dragging'));
  zone.addEventListener('drop', e => {{
    e.preventDefault();
    zone.classList.remove('dragging');
    sendFile(e.dataTransfer.files);
  }});
}}
"#,
        accepted = accepted
    )
}

pub fn render(state: &Orchestrator) -> Markup {
    let in_flight = state.is_in_flight();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                @if in_flight {
                    meta http-equiv="refresh" content=(REFRESH_SECONDS);
                }
                title { "Icon Forge" }
                style { (PreEscaped(STYLE)) }
            }
            body data-state=(state.phase().name()) {
                h1 { "Icon Forge" }
                main {
                    section {
                        h2 { "Source image" }
                        (upload::render(state.preview_handle(), state.prompt(), in_flight))
                        form class="trigger" method="post" action="/generate" {
                            label for="prompt" { "What is the icon for?" }
                            input type="text" id="prompt" name="prompt" value=(state.prompt()) placeholder=(DEFAULT_PROMPT);
                            button type="submit" disabled[!state.can_trigger()] { "Generate icon" }
                        }
                    }
                    section {
                        h2 { "Result" }
                        (ResultView::from_state(state).render())
                    }
                }
                script { (PreEscaped(upload_script())) }
            }
        }
    }
}
