// src/rendu.rs
//
// Rendu image (PNG) d’une expression via latex + dvipng.
//
// Hors du noyau : le noyau ne lance jamais de processus, il fournit seulement
// le texte affiché (Display de Expression) et l’empreinte (nom de fichier).
// Le PNG produit appartient à l’appelant (dossier temporaire conservé).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::noyau::{CalcError, CalcResult, Expression};

/// Document LaTeX minimal ; `#` est remplacé par le texte de l’expression.
const TEMPLATE: &str = "\\documentclass{article}
\\usepackage{amsmath,amssymb}
\\begin{document}
\\thispagestyle{empty}
$$ # $$
\\end{document}
";

/// Fichiers intermédiaires supprimés après compilation.
const INTERMEDIAIRES: [&str; 4] = ["tex", "dvi", "aux", "log"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Couleur de fond passée à `dvipng -bg`.
    pub background: String,
    /// Résolution passée à `dvipng -D`.
    pub density: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: "White".to_string(),
            density: 700,
        }
    }
}

pub trait Renderer {
    /// Produit l’image de `display_text`, nommée d’après `fingerprint`.
    fn render(
        &self,
        display_text: &str,
        fingerprint: &str,
        options: &RenderOptions,
    ) -> CalcResult<PathBuf>;
}

/// Chaîne `latex` -> `dvipng`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatexRenderer {
    latex: String,
    dvipng: String,
}

impl Default for LatexRenderer {
    fn default() -> Self {
        Self::with_commands("latex", "dvipng")
    }
}

impl LatexRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chemins ou noms explicites des deux outils.
    pub fn with_commands(latex: impl Into<String>, dvipng: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            dvipng: dvipng.into(),
        }
    }

    /// Outils absents (sonde `<outil> -v`).
    pub fn missing_commands(&self) -> Vec<String> {
        [&self.latex, &self.dvipng]
            .into_iter()
            .filter(|cmd| !peut_lancer(cmd))
            .cloned()
            .collect()
    }

    fn compile(&self, dir: &Path, fingerprint: &str, options: &RenderOptions) -> CalcResult<()> {
        lance(
            Command::new(&self.latex)
                .arg("-interaction=nonstopmode")
                .arg(format!("{fingerprint}.tex"))
                .current_dir(dir),
            &self.latex,
        )?;

        lance(
            Command::new(&self.dvipng)
                .args(["-q", "-T", "tight", "-bg"])
                .arg(&options.background)
                .arg("-D")
                .arg(options.density.to_string())
                .arg("-o")
                .arg(format!("{fingerprint}.png"))
                .arg(format!("{fingerprint}.dvi"))
                .current_dir(dir),
            &self.dvipng,
        )
    }
}

impl Renderer for LatexRenderer {
    fn render(
        &self,
        display_text: &str,
        fingerprint: &str,
        options: &RenderOptions,
    ) -> CalcResult<PathBuf> {
        let manquantes = self.missing_commands();
        if !manquantes.is_empty() {
            log::warn!("rendu impossible, outils absents : {}", manquantes.join(", "));
            return Err(CalcError::CommandUnavailable {
                commands: manquantes,
            });
        }

        let dir = tempfile::Builder::new()
            .prefix("calculatrice-tex-")
            .tempdir()?
            .keep();
        fs::write(
            dir.join(format!("{fingerprint}.tex")),
            tex_document(display_text),
        )?;

        let res = self.compile(&dir, fingerprint, options);

        // intermédiaires supprimés même en cas d’échec
        for ext in INTERMEDIAIRES {
            let _ = fs::remove_file(dir.join(format!("{fingerprint}.{ext}")));
        }
        res?;

        let png = dir.join(format!("{fingerprint}.png"));
        log::debug!("rendu {display_text:?} -> {}", png.display());
        Ok(png)
    }
}

/// Source LaTeX complète pour `display_text`.
pub fn tex_document(display_text: &str) -> String {
    TEMPLATE.replacen('#', display_text, 1)
}

fn peut_lancer(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("-v")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn lance(cmd: &mut Command, nom: &str) -> CalcResult<()> {
    let out = cmd.output()?;
    if out.status.success() {
        return Ok(());
    }
    Err(CalcError::Render(format!(
        "{nom} a échoué ({}) : {}",
        out.status,
        String::from_utf8_lossy(&out.stderr).trim()
    )))
}

impl Expression {
    /// Rend le texte substitué (`to_string`) sous le nom de l’empreinte.
    pub fn render_with<R: Renderer + ?Sized>(
        &self,
        renderer: &R,
        options: &RenderOptions,
    ) -> CalcResult<PathBuf> {
        renderer.render(&self.to_string(), self.fingerprint(), options)
    }
}
