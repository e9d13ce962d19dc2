use super::types::ReportDocument;
use crate::runner::state::StepStatus;

/// Render the report as a standalone HTML page
pub fn render(report: &ReportDocument) -> String {
    let total = report.success_count + report.failure_count;
    let pass_rate = if total > 0 {
        (report.success_count as f64 / total as f64 * 100.0) as u32
    } else {
        0
    };
    let status_class = if report.passed() { "passed" } else { "failed" };

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Relatório de Testes - {title}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --bg-tertiary: #1f2937;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --blue: #3b82f6;
            --purple: #8b5cf6;
            --glass: rgba(255, 255, 255, 0.03);
        }}

        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}

        body {{
            font-family: 'Inter', system-ui, -apple-system, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}

        .container {{
            max-width: 1100px;
            margin: 0 auto;
        }}

        header {{
            margin-bottom: 2rem;
            display: flex;
            justify-content: space-between;
            align-items: flex-end;
        }}

        h1 {{
            font-size: 2.25rem;
            font-weight: 800;
            letter-spacing: -0.025em;
        }}

        h2 {{
            font-size: 1.25rem;
            font-weight: 700;
            margin: 2.5rem 0 1rem;
        }}

        .page-info {{
            color: var(--text-secondary);
            font-size: 0.875rem;
            margin-bottom: 2rem;
            word-break: break-all;
        }}

        .summary {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 1.5rem;
            margin-bottom: 2rem;
        }}

        .stat {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            padding: 1.5rem;
            border-radius: 1rem;
        }}

        .stat-value {{
            font-size: 2.5rem;
            font-weight: 800;
            margin-bottom: 0.25rem;
        }}

        .stat-label {{
            color: var(--text-secondary);
            font-size: 0.875rem;
            font-weight: 500;
            text-transform: uppercase;
            letter-spacing: 0.05em;
        }}

        .stat.passed .stat-value {{ color: var(--green); }}
        .stat.failed .stat-value {{ color: var(--red); }}

        .progress-bar {{
            background: var(--bg-secondary);
            height: 12px;
            border-radius: 6px;
            overflow: hidden;
            border: 1px solid var(--border);
        }}

        .progress-fill {{
            height: 100%;
            background: linear-gradient(90deg, var(--green), #34d399);
        }}

        .group {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 1.25rem;
            margin-bottom: 1.5rem;
            overflow: hidden;
        }}

        .group-header {{
            padding: 1rem 1.5rem;
            background: var(--glass);
            border-bottom: 1px solid var(--border);
            font-weight: 700;
        }}

        .steps {{
            padding: 1rem 1.5rem;
        }}

        .step {{
            padding: 0.75rem 1rem;
            border-radius: 0.75rem;
            display: flex;
            align-items: flex-start;
            gap: 1rem;
            margin-bottom: 0.5rem;
        }}

        .step:hover {{
            background: var(--bg-tertiary);
        }}

        .step-icon {{
            width: 2rem;
            height: 2rem;
            display: flex;
            align-items: center;
            justify-content: center;
            border-radius: 0.5rem;
            flex-shrink: 0;
        }}

        .step.passed .step-icon {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .step.failed .step-icon {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}

        .step-content {{
            flex: 1;
        }}

        .step-name {{
            font-family: 'JetBrains Mono', monospace;
            font-size: 0.9375rem;
        }}

        .duration {{
            color: var(--text-secondary);
            font-size: 0.75rem;
        }}

        .error-message {{
            background: rgba(239, 68, 68, 0.1);
            border-radius: 0.5rem;
            padding: 0.75rem;
            margin-top: 0.5rem;
            color: #fca5a5;
            font-size: 0.8125rem;
            font-family: 'JetBrains Mono', monospace;
            border: 1px solid rgba(239, 68, 68, 0.2);
        }}

        .screenshots {{
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(300px, 1fr));
            gap: 1rem;
        }}

        .screenshots img {{
            width: 100%;
            border-radius: 0.75rem;
            border: 1px solid var(--border);
            cursor: pointer;
        }}

        .logs, .extractions {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 1rem;
            padding: 1rem 1.5rem;
            font-family: 'JetBrains Mono', monospace;
            font-size: 0.8125rem;
        }}

        .log-entry {{
            padding: 0.25rem 0;
            border-bottom: 1px solid var(--glass);
        }}

        .log-type {{
            color: var(--purple);
            margin-right: 0.5rem;
        }}

        .meta {{
            margin-top: 4rem;
            padding-top: 2rem;
            border-top: 1px solid var(--border);
            color: var(--text-secondary);
            font-size: 0.875rem;
            display: flex;
            justify-content: center;
            gap: 2rem;
        }}

        #modal {{
            display: none;
            position: fixed;
            z-index: 100;
            top: 0;
            left: 0;
            width: 100%;
            height: 100%;
            background: rgba(0, 0, 0, 0.9);
            padding: 2rem;
            align-items: center;
            justify-content: center;
        }}

        #modal img {{
            max-width: 100%;
            max-height: 100%;
            border-radius: 0.5rem;
        }}

        #modal.active {{
            display: flex;
        }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <div>
                <h1>Relatório de Testes</h1>
            </div>
            <div style="text-align: right;">
                <div style="font-size: 0.875rem; color: var(--text-secondary);">Duração</div>
                <div style="font-size: 1.25rem; font-weight: 700;">{duration}</div>
            </div>
        </header>

        <div class="page-info">
            <div>URL: {url}</div>
            <div>Título: {title}</div>
            <div>Data: {timestamp}</div>
        </div>

        <div class="summary">
            <div class="stat {status_class}">
                <div class="stat-value">{status}</div>
                <div class="stat-label">Status</div>
            </div>
            <div class="stat passed">
                <div class="stat-value">{success_count}</div>
                <div class="stat-label">Sucessos</div>
            </div>
            <div class="stat failed">
                <div class="stat-value">{failure_count}</div>
                <div class="stat-label">Falhas</div>
            </div>
        </div>

        <div class="progress-bar">
            <div class="progress-fill" style="width: {pass_rate}%"></div>
        </div>

        <h2>Passos Executados</h2>
        {steps_html}
        {screenshots_html}
        {extractions_html}
        {logs_html}

        <div class="meta">
            <span>Sessão: {session_id}</span>
            <span>Gerado em: {timestamp}</span>
        </div>
    </div>

    <div id="modal" onclick="this.classList.remove('active')">
        <img id="modal-img" src="" alt="Screenshot">
    </div>

    <script>
        function showScreenshot(path) {{
            document.getElementById('modal-img').src = path;
            document.getElementById('modal').classList.add('active');
        }}
    </script>
</body>
</html>"#,
        title = html_escape(&report.title),
        url = html_escape(&report.url),
        timestamp = html_escape(&report.timestamp),
        duration = format_duration(report.duration_ms),
        status = html_escape(&report.status),
        status_class = status_class,
        success_count = report.success_count,
        failure_count = report.failure_count,
        pass_rate = pass_rate,
        steps_html = steps_section(report),
        screenshots_html = screenshots_section(report),
        extractions_html = extractions_section(report),
        logs_html = logs_section(report),
        session_id = html_escape(&report.session_id),
    )
}

/// Steps in record order, one card per run of consecutive same-group records
fn steps_section(report: &ReportDocument) -> String {
    let mut html = String::new();
    let mut current: Option<&str> = None;

    for step in &report.steps {
        if current != Some(step.group.as_str()) {
            if current.is_some() {
                html.push_str("</div></div>\n");
            }
            html.push_str(&format!(
                r#"<div class="group"><div class="group-header">{}</div><div class="steps">"#,
                html_escape(&step.group)
            ));
            current = Some(step.group.as_str());
        }

        let (icon, class) = match step.status {
            StepStatus::Success => ("✓", "passed"),
            StepStatus::Failure => ("✗", "failed"),
        };
        let error_html = step
            .error
            .as_deref()
            .map(|e| format!(r#"<div class="error-message">{}</div>"#, html_escape(e)))
            .unwrap_or_default();

        html.push_str(&format!(
            r#"
                <div class="step {class}">
                    <div class="step-icon">{icon}</div>
                    <div class="step-content">
                        <div class="step-name">{}</div>
                        <span class="duration">{}</span>
                        {error_html}
                    </div>
                </div>"#,
            html_escape(&step.description),
            format_duration(step.duration_ms),
        ));
    }

    if current.is_some() {
        html.push_str("</div></div>\n");
    }
    html
}

fn screenshots_section(report: &ReportDocument) -> String {
    if report.screenshots.is_empty() {
        return String::new();
    }

    let images: String = report
        .screenshots
        .iter()
        .map(|path| {
            let path = html_escape(path);
            format!(
                r#"<img src="{path}" alt="{path}" onclick="showScreenshot(this.src)">"#
            )
        })
        .collect();

    format!(
        r#"<h2>Screenshots</h2><div class="screenshots">{}</div>"#,
        images
    )
}

fn extractions_section(report: &ReportDocument) -> String {
    if report.extractions.is_empty() {
        return String::new();
    }

    let rows: String = report
        .extractions
        .iter()
        .map(|e| {
            format!(
                r#"<div class="log-entry"><span class="log-type">{}</span>{}</div>"#,
                html_escape(&e.label),
                html_escape(&e.text)
            )
        })
        .collect();

    format!(
        r#"<h2>Dados Extraídos</h2><div class="extractions">{}</div>"#,
        rows
    )
}

fn logs_section(report: &ReportDocument) -> String {
    if report.logs.is_empty() {
        return String::new();
    }

    let rows: String = report
        .logs
        .iter()
        .map(|log| {
            format!(
                r#"<div class="log-entry"><span class="log-type">[{}]</span>{}</div>"#,
                html_escape(&log.kind),
                html_escape(&log.text)
            )
        })
        .collect();

    format!(r#"<h2>Logs do Console</h2><div class="logs">{}</div>"#, rows)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60000;
        let seconds = (ms % 60000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}
