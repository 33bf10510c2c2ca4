use console::{StyledObject, style};
use docbleach::{SanitizeReport, Threat, ThreatSeverity};

const HEADER_WIDTH: usize = 74;

#[derive(Clone, Copy)]
pub enum Tone {
    Plain,
    Good,
    Warn,
    Bad,
}

pub fn render_header() {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            "▸ DocBleach · Desarme de documentos Office ◂",
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

pub fn print_property(label: &str, value: &str, tone: Tone) {
    let label_styled = style(format!("  {}", label)).cyan().bold();
    let arrow = style("→").dim();

    let value_styled = match tone {
        Tone::Good => style(value).green(),
        Tone::Warn => style(value).yellow(),
        Tone::Bad => style(value).red(),
        Tone::Plain => style(value).white(),
    };

    println!("{} {} {}", label_styled, arrow, value_styled);
}

pub fn render_report(report: &SanitizeReport) {
    print_property("Entrada", &report.input.path, Tone::Plain);
    print_property("Tamaño original", &format_size(report.input.size), Tone::Plain);
    print_property("SHA-256 original", &report.input.sha256, Tone::Plain);
    print_property("Salida", &report.output.path, Tone::Plain);
    print_property("Tamaño saneado", &format_size(report.output.size), Tone::Plain);
    print_property("SHA-256 saneado", &report.output.sha256, Tone::Plain);

    println!();
    render_threats(&report.threats);

    let tone = match report.highest_severity {
        None => Tone::Good,
        Some(ThreatSeverity::Low) => Tone::Warn,
        Some(_) => Tone::Bad,
    };
    print_property("Resultado", &report.summary, tone);
    println!();
}

fn render_threats(threats: &[Threat]) {
    println!("{}", style("┌─ Amenazas").cyan().dim());
    if threats.is_empty() {
        println!("{} {}", style("│").cyan().dim(), style("Ninguna").green());
    }
    for threat in threats {
        println!(
            "{} {} {} {}",
            style("│").cyan().dim(),
            severity_badge(threat.severity()),
            style(threat.location()).bold(),
            style(format!("({}, {})", threat.threat_type(), threat.action())).dim()
        );
        println!("{}     {}", style("│").cyan().dim(), threat.details());
    }
    println!("{}", style("└─").cyan().dim());
}

fn severity_badge(severity: ThreatSeverity) -> StyledObject<String> {
    let label = format!("[{}]", severity);
    match severity {
        ThreatSeverity::Low => style(label).yellow(),
        ThreatSeverity::High => style(label).red(),
        ThreatSeverity::Extreme => style(label).red().bold().reverse(),
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["bytes", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit_index = 0;

    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} bytes", bytes)
    } else {
        format!("{value:.2} {} ({} bytes)", UNITS[unit_index], bytes)
    }
}
