use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.0-pro-exp-02-05";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// Fixed sampling parameters. Every request uses these; they are not
// user-configurable.
const TEMPERATURE: f64 = 1.0;
const TOP_P: f64 = 0.95;
const TOP_K: u32 = 64;
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// PRD-authoring directive sent as the opening turn of every session.
pub const SYSTEM_INSTRUCTION: &str = r#"Your task is to create a Product Requirements Document (PRD) with a **strong focus on the Frontend** aspects of the application, based solely on a user prompt describing their application. You will generate a PRD that is structured with **exactly the following four sections**:



- Product Overview

- Tech Stack

- Core Features & Functionalities

- Folder Structure (User-Defined)



You are responsible for generating detailed and informative content for the first three sections: **Product Overview**, **Tech Stack**, and **Core Features & Functionalities**, with a particular emphasis on their **Frontend implications**.  For the **Folder Structure** section, you will explicitly acknowledge that this section is to be defined and implemented by the user and therefore you will not generate content for it.  You must always respond in English.



Specifically:



* **Understand the Application from the Prompt (Frontend Perspective):** Begin by thoroughly analyzing the user's prompt to fully understand the core concept and purpose of their application, specifically focusing on the **user interface, user experience, and client-side interactions**. This understanding is essential for creating relevant PRD content with a frontend focus.

* **Focus on PRD Detailing, Not Code Generation (Frontend Emphasis):** Your primary goal is to deliver a detailed and informative PRD document, emphasizing the **Frontend requirements and specifications**. Do not generate any code.

* **Structure the PRD with Exactly Four Sections (Headings):** The PRD you generate **must be structured with exactly these four section headings**: "Product Overview", "Tech Stack", "Core Features & Functionalities", and "Folder Structure". Use these exact headings in your response.

* **Generate Content for "Product Overview", "Tech Stack", and "Core Features & Functionalities" (Frontend Focused):**  Provide detailed and informative content for each of these three sections based on the user's application description, **prioritizing the frontend aspects**. Elaborate on the product's purpose as it relates to the user interface, the frontend technologies to be used, and the functionalities from a user-facing perspective.

* **Tech Stack Section - Bulleted List Only (Include Lucide React for Icons):** In the "Tech Stack" section, you will **only provide a bulleted list of relevant frontend technologies**. **Do not include any descriptions or explanations for each technology.** Simply list the names of technologies, libraries, and frameworks that are suitable for the frontend of the application. **If icons are likely to be needed for the frontend of this application, you must include "Lucide React" in the Tech Stack list.** For example:



   **Tech Stack:**



   * React

   * Tailwind CSS

   * Zustand

   * Lucide React *(Include if icons are relevant)*

   * [Other relevant frontend technologies]



* **Acknowledge "Folder Structure" as User-Defined:** For the "Folder Structure" section, explicitly state that the user will define and implement this section independently. Do not attempt to generate any content or suggestions for the folder structure. You can include a sentence like: "**Folder Structure:**  To be defined and implemented by the user.**" under this heading.

* **Elaborate Implementation Details for Core Features & Functionalities (Frontend Implementation):** Within the "Core Features & Functionalities" section, be sure to provide in-depth implementation details for each listed feature, focusing on the **frontend implementation**. Consider user interface interactions, data presentation on the client-side, client-side logic, user experience flows, and frontend data handling. Think about how these features will be realized in the user interface.

* **Prioritize Document Conciseness and Clarity (Frontend Developers as Audience):** Ensure the content within each of the sections you generate is clear, concise, and easily understood by **frontend developers**. Use direct language and organize the information logically within each section, keeping the frontend perspective in mind.

* **Always Respond in English:** You must always respond in English, regardless of the language of the user's initial prompt.
* **Start immediately with "Product Overview"** Begin your response with the "Product Overview" section, without any additional introduction or preamble. Start directly with the content for this section."#;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// One role-tagged conversation turn.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    fn text(&self) -> String {
        self.parts.iter().map(|part| part.text.as_str()).collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
}

impl GenerationConfig {
    fn fixed() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Resolve the credential (env var, then config file) and build a client.
    /// A missing credential is fatal here, before any terminal setup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| Error::MissingApiKey {
            config_path: Config::display_path(),
        })?;

        let mut client = Self::new(api_key);
        if let Some(model) = &config.model {
            client.model = model.clone();
        }
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn start_chat(&self, history: Vec<Content>) -> ChatSession {
        ChatSession {
            client: self.clone(),
            history,
        }
    }

    /// Generate a PRD for `prompt`. The fixed directive goes out as its own
    /// opening turn; the reply to the prompt turn is the document, returned
    /// verbatim.
    pub async fn generate_prd(&self, prompt: &str, history: &[Content]) -> Result<String> {
        let mut chat = self.start_chat(history.to_vec());

        chat.send_message(SYSTEM_INSTRUCTION).await?;

        let document = chat.send_message(prompt).await?;
        info!(bytes = document.len(), model = %self.model, "PRD generated");
        Ok(document)
    }

    async fn generate(&self, contents: &[Content]) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateRequest {
            contents,
            generation_config: GenerationConfig::fixed(),
        };

        debug!(turns = contents.len(), model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(Error::generation(format!(
                "Gemini API error {status}: {message}"
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let Some(candidate) = body.candidates.into_iter().next() else {
            return Err(Error::generation("Empty response: no candidates returned"));
        };

        let text = candidate.content.text();
        if text.is_empty() {
            return Err(Error::generation("Empty response: candidate carried no text"));
        }
        Ok(text)
    }
}

/// Conversation state for one generation. Each message posts the full turn
/// history and appends the model's reply to it.
pub struct ChatSession {
    client: GeminiClient,
    history: Vec<Content>,
}

impl ChatSession {
    pub async fn send_message(&mut self, text: &str) -> Result<String> {
        self.history.push(Content::user(text));
        let reply = self.client.generate(&self.history).await?;
        self.history.push(Content::model(reply.clone()));
        Ok(reply)
    }
}
