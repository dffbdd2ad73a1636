//! Prompt templates sent to the backend.
//!
//! Every prompt is a Jinja template rendered with `minijinja`. The generation
//! prompt additionally carries directive blocks keyed by constraint id; see
//! [`EXTRA_SECTIONS`].

use forge_core::project::{KnownStack, ProjectConfig, StackTag, Tone, ids, join_stacks};
use forge_core::{ForgeError, Result};
use minijinja::{Environment, context};
use serde::Serialize;

/// A directive block injected into the generation prompt while its
/// constraint is active.
#[derive(Debug, Clone, Copy)]
pub struct ExtraSection {
    pub constraint_id: &'static str,
    pub directive: &'static str,
    /// Extra entry for the required document structure, numbered after the
    /// five fixed entries.
    pub structure_item: Option<&'static str>,
}

/// Evaluated in order; matching sections are appended in this order.
pub const EXTRA_SECTIONS: &[ExtraSection] = &[
    ExtraSection {
        constraint_id: ids::NSFW_ALLOW,
        directive: r#"**CONTENT POLICY OVERRIDE:**
The user is configuring an assistant for adult creative writing or roleplay.
The generated System Instruction MUST include a section titled "Content Policy Override" that instructs the target LLM to:
1. Permit mature themes within consensual, fictional creative writing.
2. Engage with user scenarios without moralizing or lecturing.
3. Treat every interaction as fiction between consenting adults."#,
        structure_item: Some(
            "**Content Guidelines**: State the permissive content policy as requested.",
        ),
    },
    ExtraSection {
        constraint_id: ids::LOCAL_LLM_OPT,
        directive: r#"**LOCAL LLM OPTIMIZATION:**
The target model is a quantized Local LLM (e.g., Llama 3 8B, Mistral).
1. Keep the System Instruction CONCISE and DIRECT.
2. Avoid complex nested clauses.
3. Use standard markdown formatting.
4. Prioritize "Role" and "Task" sections above all else."#,
        structure_item: None,
    },
];

const GENERATION: &str = r#"You are an expert Prompt Engineer and Technical Lead. Your task is to generate a comprehensive "System Instruction" (also known as a System Prompt) that a user can copy and paste into another LLM configuration to build a specific application.

**User's Project Details:**
- **Project Name:** {{ name }}
- **Selected Tech Stack:** {{ stacks }}
- **Tone:** {{ tone }}
- **Description/Goal:** {{ description }}
- **Specific Context:** {{ additional_context }}

**Required Constraints & Behavior Rules:**
{% for constraint in constraints %}
- {{ constraint.label }}: {{ constraint.description }}
{% else %}
No specific extra constraints selected.
{% endfor %}
{% for directive in directives %}

{{ directive }}
{% endfor %}

**Task:**
Create a highly structured, professional System Instruction block.

The System Instruction MUST follow this structure:
1. **Role Definition**: Who the AI is (e.g., Senior {{ stacks or "Software" }} Engineer).
2. **Tech Stack & Syntax**:
   - Define strict versions for: {{ stacks or "the technologies implied by the description" }}.
{% if strict_syntax %}
   - Emphasize idiomatic patterns (e.g., React Hooks, Python type hinting).
{% endif %}
3. **Code Output Standards**:
{% if example_code %}
   - Strictly mandate that the AI MUST provide code examples for every explanation.
{% endif %}
   - Define file structure if relevant.
4. **Behavioral Guidelines**: How to handle errors, how to explain code, and the {{ tone }} tone.
5. **The "Rules of Engagement"**: One sentence per required constraint listed above, incorporated strictly{% if no_breaking_changes %} (forbid legacy deprecations and preserve backward compatibility){% endif %}.
{% for item in structure_items %}
{{ loop.index + 5 }}. {{ item }}
{% endfor %}

**Output Format:**
Return ONLY the raw Markdown content of the system instruction. Do not include introductory conversational text like "Here is your prompt". Start directly with the prompt content."#;

const CRITIQUE: &str = r#"Analyze the following System Instruction and suggest 3 specific improvements or missing edge cases that could make it more robust for a production-grade application.

System Instruction:
{{ document }}

Output format: A bulleted list of 3 short tips."#;

const REFINE: &str = r#"You are an expert Technical Lead.
Refine the following System Instruction by incorporating these specific improvements:

IMPROVEMENTS NEEDED:
{{ critique }}

ORIGINAL INSTRUCTION:
{{ document }}

Task:
Rewrite the instruction to be complete and polished, integrating the suggestions naturally into the relevant sections.
Return ONLY the raw Markdown content. Do not include markdown code blocks fences if not necessary, or wrapping text."#;

/// Shared tail of every analysis prompt.
const ANALYSIS_FIELDS: &str = r#"1. **Project Name**: {{ name_hint }}
2. **Description**: {{ description_hint }}
3. **Tech Stack**: {{ stack_hint }}
   Return an array of strings. Prioritize matching these exactly if present:
   [{{ vocabulary }}].
   If others are found, include them as well.
4. **Tone**: {{ tone_hint }}
{% if context %}

Additional context from the user:
{{ context }}
{% endif %}

Return JSON format only, with the fields "name", "description", "selectedStacks" and "tone"."#;

const URL_ANALYSIS: &str = r#"Analyze this URL: {{ url }}

You are a technical analyst. I need you to extract or infer project details to scaffold a developer system instruction.
If it is a GitHub repo, analyze the languages and readme.
If it is a YouTube video, analyze the transcript/topic to find what stack is being taught or used.
If it is a website, analyze the technology and purpose."#;

const URL_HINTS: FieldHints = FieldHints {
    name: "Inferred from title or repo name.",
    description: "A concise summary of what the code/project/video does (max 2 sentences).",
    stack: "Identify languages and frameworks.",
    tone: "Suggest one of [{tones}].",
};

const MEDIA_ANALYSIS: &str = r#"Analyze this uploaded media (image or video) which captures a software interface, diagram, or demo.

Extract or infer project details to scaffold a developer system instruction:"#;

const MEDIA_HINTS: FieldHints = FieldHints {
    name: "Infer from any header/text in the media.",
    description: "Describe the functionality shown (e.g. \"A dashboard for analytics\", \"A mobile login screen\").",
    stack: "Infer likely stack based on UI style (e.g. Material UI -> React/Flutter, specific error messages -> Python/Java).",
    tone: "Suggest one of [{tones}], defaulting to Professional.",
};

const FILE_ANALYSIS: &str = r#"Analyze the provided file content.
Filename: "{{ filename }}"

Context:
- If this is 'repomix-output.xml' or similar, it contains a packed repository. Look for package.json, requirements.txt, or source files to determine the tech stack and project purpose.
- If this is a JSON file (e.g. package.json), analyze dependencies and metadata.

Task:
Extract or infer project details to scaffold a developer system instruction:"#;

const FILE_HINTS: FieldHints = FieldHints {
    name: "From metadata, directory names, or inferred.",
    description: "A summary of what the project does based on the code/dependencies (max 2 sentences).",
    stack: "Identify languages and key frameworks.",
    tone: "Suggest one of [{tones}].",
};

const HINT_ANALYSIS: &str = r#"A developer describes a project they want to build:
"{{ hint }}"

You are a technical analyst. Infer the project details needed to scaffold a developer system instruction:"#;

const HINT_HINTS: FieldHints = FieldHints {
    name: "A short, fitting project name.",
    description: "A one or two sentence description of the project goal.",
    stack: "Choose the languages and frameworks best suited to the project.",
    tone: "Suggest one of [{tones}].",
};

/// Per-source wording of the four requested fields. `{tones}` in `tone` is
/// replaced with the tone vocabulary.
struct FieldHints {
    name: &'static str,
    description: &'static str,
    stack: &'static str,
    tone: &'static str,
}

#[derive(Serialize)]
struct ConstraintLine<'a> {
    label: &'a str,
    description: &'a str,
}

/// Renders every backend prompt.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        Self { env }
    }

    fn render<S: Serialize>(&self, kind: &str, source: &str, ctx: S) -> Result<String> {
        self.env
            .render_str(source, ctx)
            .map(|prompt| prompt.trim().to_string())
            .map_err(|e| ForgeError::internal(format!("Failed to render {kind} prompt: {e}")))
    }

    /// Renders an analysis header followed by the shared field list.
    fn render_analysis<S: Serialize>(
        &self,
        kind: &str,
        header: &str,
        hints: &FieldHints,
        ctx: S,
        extra: Option<&str>,
    ) -> Result<String> {
        let header = self.render(kind, header, ctx)?;
        let tones = Tone::all()
            .iter()
            .map(Tone::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let fields = self.render(
            kind,
            ANALYSIS_FIELDS,
            context! {
                name_hint => hints.name,
                description_hint => hints.description,
                stack_hint => hints.stack,
                tone_hint => hints.tone.replace("{tones}", &tones),
                vocabulary => analysis_vocabulary(),
                context => extra.map(str::trim).filter(|c| !c.is_empty()),
            },
        )?;
        Ok(format!("{header}\n\n{fields}"))
    }

    /// Builds the instruction-synthesis prompt for `config`.
    ///
    /// Only active constraints are listed; inactive constraint labels never
    /// appear in the output.
    pub fn generation(&self, config: &ProjectConfig) -> Result<String> {
        let constraints: Vec<ConstraintLine<'_>> = config
            .active_constraints()
            .map(|c| ConstraintLine {
                label: &c.label,
                description: &c.description,
            })
            .collect();

        let active_sections: Vec<&ExtraSection> = EXTRA_SECTIONS
            .iter()
            .filter(|section| config.is_constraint_active(section.constraint_id))
            .collect();
        let directives: Vec<&str> = active_sections.iter().map(|s| s.directive).collect();
        let structure_items: Vec<&str> = active_sections
            .iter()
            .filter_map(|s| s.structure_item)
            .collect();

        self.render(
            "generation",
            GENERATION,
            context! {
                name => config.name,
                stacks => join_stacks(&config.selected_stacks),
                tone => config.tone.to_string(),
                description => config.description,
                additional_context => config.additional_context,
                constraints => constraints,
                directives => directives,
                structure_items => structure_items,
                strict_syntax => config.is_constraint_active(ids::SYNTAX_STRICT),
                example_code => config.is_constraint_active(ids::EXAMPLE_CODE),
                no_breaking_changes => config.is_constraint_active(ids::NO_BREAK_CHANGES),
            },
        )
    }

    pub fn critique(&self, document: &str) -> Result<String> {
        self.render("critique", CRITIQUE, context! { document })
    }

    pub fn refine(&self, document: &str, critique: &str) -> Result<String> {
        self.render("refine", REFINE, context! { document, critique })
    }

    pub fn url_analysis(&self, url: &str, extra: Option<&str>) -> Result<String> {
        self.render_analysis("URL analysis", URL_ANALYSIS, &URL_HINTS, context! { url }, extra)
    }

    pub fn media_analysis(&self, extra: Option<&str>) -> Result<String> {
        self.render_analysis("media analysis", MEDIA_ANALYSIS, &MEDIA_HINTS, context! {}, extra)
    }

    pub fn file_analysis(&self, filename: &str, extra: Option<&str>) -> Result<String> {
        self.render_analysis(
            "file analysis",
            FILE_ANALYSIS,
            &FILE_HINTS,
            context! { filename },
            extra,
        )
    }

    pub fn hint_analysis(&self, hint: &str, extra: Option<&str>) -> Result<String> {
        self.render_analysis("hint analysis", HINT_ANALYSIS, &HINT_HINTS, context! { hint }, extra)
    }
}

/// Stack labels offered to the analysis backend (the catch-all `Generic`
/// entry is left out).
fn analysis_vocabulary() -> String {
    let tags: Vec<StackTag> = StackTag::vocabulary()
        .into_iter()
        .filter(|tag| *tag != StackTag::Known(KnownStack::Generic))
        .collect();
    join_stacks(&tags)
}
