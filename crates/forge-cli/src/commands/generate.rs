use anyhow::{Context, Result, bail};
use clap::Args;
use forge_application::{AnalysisSource, ForgeSession, UploadedFile};
use forge_core::config::ForgeConfig;
use forge_core::project::{Tone, normalize_stacks};
use forge_interaction::GeminiApiAgent;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Project name
    #[arg(long)]
    name: Option<String>,

    /// What the project should do
    #[arg(long, short)]
    description: Option<String>,

    /// Technology tag; repeat to select several (replaces the current selection)
    #[arg(long = "stack")]
    stacks: Vec<String>,

    /// Professional, Educational, Concise or Socratic
    #[arg(long)]
    tone: Option<String>,

    /// Additional context embedded in the instruction
    #[arg(long)]
    context: Option<String>,

    /// Flip a constraint by id; repeatable (see `forge constraints`)
    #[arg(long = "toggle")]
    toggles: Vec<String>,

    /// Start from a built-in template (see `forge templates`)
    #[arg(long)]
    template: Option<String>,

    /// Infer project details from a URL before generating
    #[arg(long, conflicts_with_all = ["from_file", "from_hint"])]
    from_url: Option<String>,

    /// Infer project details from a JSON/XML file, image or video
    #[arg(long, conflicts_with = "from_hint")]
    from_file: Option<PathBuf>,

    /// Infer project details from a short free-form description
    #[arg(long)]
    from_hint: Option<String>,

    /// Extra guidance for the analysis step
    #[arg(long)]
    analysis_context: Option<String>,

    /// Fetch improvement suggestions after generating
    #[arg(long)]
    critique: bool,

    /// Apply the suggestions to the generated instruction
    #[arg(long, requires = "critique")]
    refine: bool,

    /// Print the generation prompt instead of calling the backend
    #[arg(long)]
    dry_run: bool,
}

impl GenerateArgs {
    async fn analysis_source(&self) -> Result<Option<AnalysisSource>> {
        if let Some(url) = &self.from_url {
            return Ok(Some(AnalysisSource::Url(url.clone())));
        }
        if let Some(path) = &self.from_file {
            let file = UploadedFile::read(path).await?;
            return Ok(Some(AnalysisSource::File(file)));
        }
        Ok(self.from_hint.clone().map(AnalysisSource::Hint))
    }

    /// Applies explicit flags on top of the template and analysis results.
    fn apply_overrides(&self, session: &mut ForgeSession) -> Result<()> {
        let config = session.config_mut();
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(description) = &self.description {
            config.description = description.clone();
        }
        if !self.stacks.is_empty() {
            config.selected_stacks = normalize_stacks(self.stacks.clone());
        }
        if let Some(raw) = &self.tone {
            let tone = Tone::parse(raw).with_context(|| format!("Unknown tone '{raw}'"))?;
            config.set_tone(tone);
        }
        if let Some(context) = &self.context {
            config.additional_context = context.clone();
        }
        for id in &self.toggles {
            if !config.toggle_constraint(id) {
                bail!("Unknown constraint id '{id}' (see `forge constraints`)");
            }
        }
        Ok(())
    }
}

pub async fn run(args: GenerateArgs, settings: &ForgeConfig) -> Result<()> {
    let agent = Arc::new(GeminiApiAgent::from_env());
    let mut session = ForgeSession::new(agent, settings);
    tracing::debug!("[CLI] Session {}", session.id());

    let mut console = session.console().subscribe();
    let printer = tokio::spawn(async move {
        while let Some(line) = console.recv().await {
            eprintln!("{line}");
        }
    });

    let outcome = drive(&args, &mut session).await;
    session.shutdown();
    drop(session);
    if let Err(e) = printer.await {
        tracing::warn!("[CLI] Console printer stopped: {}", e);
    }

    let document = outcome?;
    println!("{document}");
    Ok(())
}

async fn drive(args: &GenerateArgs, session: &mut ForgeSession) -> Result<String> {
    if let Some(template) = &args.template {
        session.apply_template(template)?;
    }

    if let Some(source) = args.analysis_source().await? {
        run_analysis(session, source, args.analysis_context.as_deref()).await?;
    }

    args.apply_overrides(session)?;

    if args.dry_run {
        return Ok(session.synthesizer().build_prompt(session.config())?);
    }

    if !session.config().can_submit() {
        bail!(
            "A description is required; pass --description or one of \
             --from-url/--from-file/--from-hint"
        );
    }

    let mut document = session.generate().await?.to_string();

    if args.critique {
        let critique = session.critique().await?;
        eprintln!("\nSuggestions:\n{}\n", critique.text);

        if args.refine {
            if critique.degraded {
                eprintln!("No usable suggestions; keeping the generated instruction.");
            } else {
                document = session.apply_critique().await?.to_string();
            }
        }
    }

    Ok(document)
}

/// Runs the analysis step. Backend failures are already on the console and
/// leave the configuration untouched, so the run continues; bad input and
/// missing credentials stop it.
async fn run_analysis(
    session: &mut ForgeSession,
    source: AnalysisSource,
    context: Option<&str>,
) -> Result<()> {
    match session.analyze(source, context).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_validation() || e.is_config() => Err(e.into()),
        Err(e) => {
            tracing::debug!("[CLI] Continuing without analysis: {}", e);
            Ok(())
        }
    }
}
