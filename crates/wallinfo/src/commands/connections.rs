//! Connection command handlers.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tabled::Tabled;
use wallinfo_config::{forget_secret, resolve_secret, store_secret};
use wallinfo_core::{AuthType, Connection, ConnectionInspection, ContentType, HttpMethod};

use crate::cli::{
    AuthArg, ConnectionPatch, ConnectionSpec, ConnectionsArgs, ConnectionsCommand, GlobalOpts,
    MethodArg,
};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Arg conversions ─────────────────────────────────────────────────

impl From<MethodArg> for HttpMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Get => Self::Get,
            MethodArg::Post => Self::Post,
        }
    }
}

impl From<AuthArg> for AuthType {
    fn from(a: AuthArg) -> Self {
        match a {
            AuthArg::None => Self::None,
            AuthArg::Basic => Self::Basic,
            AuthArg::Bearer => Self::Bearer,
        }
    }
}

// ── Views ───────────────────────────────────────────────────────────

/// Serializable connection with the secret reduced to a flag.
#[derive(Serialize)]
struct ConnectionView<'a> {
    name: &'a str,
    url: &'a str,
    kind: String,
    method: String,
    auth_type: String,
    username: &'a str,
    has_secret: bool,
    content_type: String,
    selector: &'a str,
}

impl<'a> From<&'a Connection> for ConnectionView<'a> {
    fn from(c: &'a Connection) -> Self {
        Self {
            name: &c.name,
            url: &c.url,
            kind: c.source().kind().to_string(),
            method: c.method.to_string(),
            auth_type: c.auth_type.to_string(),
            username: &c.username,
            has_secret: !c.secret.is_empty(),
            content_type: c.content_type.to_string(),
            selector: c.selector(),
        }
    }
}

impl ConnectionView<'_> {
    fn extraction(&self) -> String {
        if self.selector.trim().is_empty() {
            "raw".into()
        } else {
            format!("{} {}", self.content_type, self.selector)
        }
    }
}

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Location")]
    url: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Auth")]
    auth: String,
    #[tabled(rename = "Extract")]
    extract: String,
}

impl From<&ConnectionView<'_>> for ConnectionRow {
    fn from(v: &ConnectionView<'_>) -> Self {
        Self {
            name: v.name.to_owned(),
            kind: v.kind.clone(),
            url: v.url.to_owned(),
            method: if v.kind == "http" {
                v.method.clone()
            } else {
                "-".into()
            },
            auth: v.auth_type.clone(),
            extract: v.extraction(),
        }
    }
}

fn detail(v: &ConnectionView<'_>) -> String {
    let secret = match (v.auth_type.as_str(), v.has_secret) {
        ("None", _) => "-",
        (_, true) => "(inline)",
        (_, false) => "(env / keyring)",
    };
    [
        format!("Name:     {}", v.name),
        format!("Tag:      {{API:{}}}", v.name),
        format!("Kind:     {}", v.kind),
        format!("Location: {}", v.url),
        format!("Method:   {}", v.method),
        format!("Auth:     {}", v.auth_type),
        format!(
            "Username: {}",
            if v.username.is_empty() { "-" } else { v.username }
        ),
        format!("Secret:   {secret}"),
        format!("Extract:  {}", v.extraction()),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct InspectView<'a> {
    connection: &'a str,
    kind: String,
    status: &'static str,
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    raw: Option<&'a str>,
}

impl<'a> InspectView<'a> {
    fn new(name: &'a str, report: &'a ConnectionInspection) -> Self {
        Self {
            connection: name,
            kind: report.kind.to_string(),
            status: report.resolution.status(),
            value: report.resolution.substitution(),
            detail: report.resolution.detail(),
            raw: report.raw.as_deref(),
        }
    }
}

fn inspect_detail(v: &InspectView<'_>, color: bool) -> String {
    let ok = v.status == "ok";
    let mut lines = vec![
        format!("Connection: {}", v.connection),
        format!("Kind:       {}", v.kind),
        format!("Status:     {}", output::status_word(v.status, ok, color)),
        format!("Value:      {}", v.value),
    ];
    if let Some(ref detail) = v.detail {
        lines.push(format!("Detail:     {detail}"));
    }
    if let Some(raw) = v.raw {
        lines.push(output::dim("── Raw response ──", color));
        lines.push(raw.trim_end().to_owned());
    }
    lines.join("\n")
}

// ── Builders ────────────────────────────────────────────────────────

fn from_spec(spec: ConnectionSpec) -> Connection {
    let mut conn = Connection::new(spec.name, spec.url).with_method(spec.method.into());
    conn.auth_type = spec.auth.into();
    conn.username = spec.username.unwrap_or_default();
    conn.secret = spec.secret.unwrap_or_default();

    if let Some(pattern) = spec.regex {
        conn.with_regex(pattern)
    } else if let Some(path) = spec.json_path {
        conn.with_json_path(path)
    } else {
        conn
    }
}

fn apply_patch(conn: &mut Connection, patch: ConnectionPatch) {
    if let Some(name) = patch.rename {
        conn.name = name;
    }
    if let Some(url) = patch.url {
        conn.url = url;
    }
    if let Some(method) = patch.method {
        conn.method = method.into();
    }
    if let Some(auth) = patch.auth {
        conn.auth_type = auth.into();
    }
    if let Some(username) = patch.username {
        conn.username = username;
    }
    if let Some(secret) = patch.secret {
        conn.secret = secret;
    }
    if let Some(path) = patch.json_path {
        conn.content_type = ContentType::Json;
        conn.json_path = path;
    }
    if let Some(pattern) = patch.regex {
        conn.content_type = ContentType::Text;
        conn.regex_pattern = pattern;
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    args: ConnectionsArgs,
    ctx: &Context,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ConnectionsCommand::List => {
            let registry = ctx.registry()?;
            let views: Vec<ConnectionView<'_>> = registry.iter().map(ConnectionView::from).collect();
            if views.is_empty() && matches!(global.output, crate::cli::OutputFormat::Table) {
                if !global.quiet {
                    eprintln!("No connections. Add one with: wallinfo connections add <name> --url <location>");
                }
                return Ok(());
            }
            let out = output::render_list(
                &global.output,
                &views,
                |v: &ConnectionView<'_>| ConnectionRow::from(v),
                |v| v.name.to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Show { name } => {
            let registry = ctx.registry()?;
            let view = ConnectionView::from(util::find(&registry, &name)?);
            let out = output::render_single(&global.output, &view, detail, |v| v.name.to_owned());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Add(spec) => {
            let mut registry = ctx.registry()?;
            let conn = from_spec(spec);
            let tag = conn.tag();
            let name = conn.name.clone();

            registry.add(conn)?;
            ctx.save_registry(&registry)?;

            if !global.quiet {
                eprintln!("✓ Added connection '{name}'. Use {tag} in templates.");
            }
            Ok(())
        }

        ConnectionsCommand::Update { name, patch } => {
            let mut registry = ctx.registry()?;
            let mut conn = util::find(&registry, &name)?.clone();
            apply_patch(&mut conn, patch);
            let new_name = conn.name.clone();

            registry.update(&name, conn)?;
            ctx.save_registry(&registry)?;

            if !global.quiet {
                if new_name == name {
                    eprintln!("✓ Updated connection '{name}'");
                } else {
                    eprintln!("✓ Updated connection '{name}' (now '{new_name}')");
                }
            }
            Ok(())
        }

        ConnectionsCommand::Delete { name, yes } => {
            let mut registry = ctx.registry()?;
            util::find(&registry, &name)?;

            let prompt = format!("Delete connection '{name}'?");
            if !util::confirm(&prompt, yes, "connections delete")? {
                eprintln!("Aborted.");
                return Ok(());
            }

            let removed = registry.remove(&name)?;
            ctx.save_registry(&registry)?;

            if removed.auth_type != AuthType::None {
                if let Err(e) = forget_secret(&name) {
                    tracing::debug!(connection = %name, error = %e, "keyring cleanup skipped");
                }
            }

            if !global.quiet {
                eprintln!("✓ Deleted connection '{name}'");
            }
            Ok(())
        }

        ConnectionsCommand::Test { name } => {
            let registry = ctx.registry()?;
            let mut conn = util::find(&registry, &name)?.clone();
            if conn.needs_secret() {
                if let Some(secret) = resolve_secret(&conn.name) {
                    conn.secret = secret.expose_secret().to_owned();
                }
            }

            let renderer = util::renderer(ctx, None)?;
            let report = renderer.inspect(&conn).await;
            let view = InspectView::new(&conn.name, &report);

            let out = output::render_single(
                &global.output,
                &view,
                |v| inspect_detail(v, color),
                |v| v.value.to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::SetSecret { name } => {
            let registry = ctx.registry()?;
            let conn = util::find(&registry, &name)?;

            if conn.auth_type == AuthType::None {
                eprintln!("Note: '{name}' uses no authentication; the secret is unused until auth is set.");
            }

            let secret = rpassword::prompt_password(format!("Password or token for '{name}': "))
                .map_err(util::prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            store_secret(&name, &SecretString::from(secret))?;

            if !conn.secret.is_empty() {
                eprintln!(
                    "Note: '{name}' also has an inline secret in the connections file, which takes precedence."
                );
            }
            if !global.quiet {
                eprintln!("✓ Secret stored in system keyring for '{name}'");
            }
            Ok(())
        }
    }
}
