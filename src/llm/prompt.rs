//! Prompt builder for the three generation calls.
//!
//! [`PromptBuilder`] produces `(system_msg, user_msg)` pairs for any
//! OpenAI-compatible `/v1/chat/completions` endpoint:
//!
//! * `correction_chat` — fix grammar/spelling/punctuation of one fragment.
//! * `seed_chat` — structure the first fragment into the initial document.
//! * `extend_chat` — structure a later fragment against trailing context.
//!
//! The transcript language is selected at construction time; Spanish (`"es"`)
//! and English (`"en"`) have dedicated instructions.  Any other language code
//! falls back to the English instructions.

// ---------------------------------------------------------------------------
// Correction instructions
// ---------------------------------------------------------------------------

const CORRECTION_SYSTEM_ES: &str = "\
Eres un corrector de transcripciones de voz en español.
Tarea: corregir el texto crudo de una transcripción.

Reglas:
1. Corrige los errores gramaticales.
2. Corrige las faltas de ortografía.
3. Añade la puntuación adecuada (comas, puntos, etc.).
4. NO cambies el contenido ni el significado.
5. Responde únicamente con el texto corregido, sin explicaciones ni formato extra.";

const CORRECTION_SYSTEM_EN: &str = "\
You are a proofreader for raw speech transcriptions.
Task: correct the raw transcription text.

Rules:
1. Fix grammatical errors.
2. Fix spelling mistakes.
3. Add appropriate punctuation (commas, periods, etc.).
4. Do NOT change the content or meaning.
5. Reply with ONLY the corrected text — no explanation, no extra formatting.";

// ---------------------------------------------------------------------------
// Seed instructions (first fragment → initial document)
// ---------------------------------------------------------------------------

const SEED_SYSTEM_ES: &str = "\
Eres un asistente de procesamiento de texto. Recibirás el primer fragmento de
una transcripción y debes empezar a estructurarla como documento Markdown en
español.

Reglas:
1. Identifica el tema o sección principal de este fragmento inicial.
2. Crea un título descriptivo para la sección con un encabezado Markdown (p. ej. ## Título).
3. Organiza el contenido de forma lógica y legible bajo el título.
4. Responde únicamente con el contenido Markdown procesado.";

const SEED_SYSTEM_EN: &str = "\
You are a text-processing assistant. You will receive the first fragment of a
transcription and must begin structuring it into a Markdown document.

Rules:
1. Identify the main topic or section in this initial piece of text.
2. Create a descriptive title for the section using a Markdown heading (e.g. ## Title).
3. Organize the content in a logical and readable manner under the title.
4. Reply with ONLY the processed Markdown content.";

// ---------------------------------------------------------------------------
// Extend instructions (later fragments → incremental addition)
// ---------------------------------------------------------------------------

const EXTEND_SYSTEM_ES: &str = "\
Eres un asistente de procesamiento de texto que continúa construyendo un
documento Markdown en español. Recibirás las últimas palabras del documento
existente y un nuevo fragmento de texto.

Reglas:
1. Analiza el nuevo fragmento en el contexto del texto anterior.
2. Decide si continúa el tema anterior o empieza uno nuevo.
3. Si empieza un tema nuevo, crea un título Markdown descriptivo (p. ej. ## Nuevo Tema).
4. Estructura el contenido del nuevo fragmento de forma lógica.
5. Asegura una transición natural desde el texto anterior.
6. Responde ÚNICAMENTE con el contenido nuevo estructurado. No repitas el contexto anterior.";

const EXTEND_SYSTEM_EN: &str = "\
You are a text-processing assistant continuing to build a Markdown document.
You will be given the last few words of the existing document and a new
fragment of text.

Rules:
1. Analyze the new fragment in the context of the previous text.
2. Decide if it continues the previous topic or starts a new one.
3. If it starts a new topic, create a descriptive Markdown heading (e.g. ## New Topic).
4. Structure the new fragment's content logically.
5. Ensure a natural transition from the previous text.
6. Reply with ONLY the newly structured content. Do not repeat the previous context.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds chat prompts for correction, seeding and continuation.
///
/// # Example
/// ```rust
/// use cloud_scribe::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new("es");
/// let (system, user) = builder.correction_chat("hola como estas");
/// assert!(system.contains("corrector"));
/// assert!(user.contains("hola como estas"));
/// ```
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    /// Create a new builder for the given ISO-639-1 language code.
    ///
    /// Supported codes with dedicated instructions: `"es"`, `"en"`.
    /// Any other code falls back to English instructions.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    /// Build the `(system_msg, user_msg)` pair for a correction call.
    pub fn correction_chat(&self, raw: &str) -> (String, String) {
        let system = self.pick(CORRECTION_SYSTEM_ES, CORRECTION_SYSTEM_EN);
        let user = format!("Raw transcription:\n---\n{}\n---\n\nCorrected:\n", raw);
        (system.to_string(), user)
    }

    /// Build the `(system_msg, user_msg)` pair for the initial structuring
    /// call.
    pub fn seed_chat(&self, text: &str) -> (String, String) {
        let system = self.pick(SEED_SYSTEM_ES, SEED_SYSTEM_EN);
        let user = format!("First fragment:\n---\n{}\n---\n", text);
        (system.to_string(), user)
    }

    /// Build the `(system_msg, user_msg)` pair for a continuation call.
    ///
    /// `context` is the trailing portion of the document built so far;
    /// `text` is the new fragment to structure and append.
    pub fn extend_chat(&self, context: &str, text: &str) -> (String, String) {
        let system = self.pick(EXTEND_SYSTEM_ES, EXTEND_SYSTEM_EN);
        let user = format!(
            "Previous context (last words of the document):\n---\n{}\n---\n\n\
             New fragment to structure and append:\n---\n{}\n---\n",
            context, text
        );
        (system.to_string(), user)
    }

    fn pick(&self, es: &'static str, en: &'static str) -> &'static str {
        match self.language.as_str() {
            "es" => es,
            _ => en,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
