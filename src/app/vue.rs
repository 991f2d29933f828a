// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter analyse + calcule (quand le champ a le focus)
// - Boutons TeX : insèrent \frac{}{}, \sqrt{}, \cdot… dans l’entrée
// - Un champ par variable ; champ vide = variable non liée

use eframe::egui;

use super::etat::AppCalc;

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice TeX");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_variables(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_sorties(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Expression :");

        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 2 \\cdot \\frac{x}{3} + \\sqrt[3]{y}")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        // Enter : nouvelle analyse puis calcul (seulement si le champ est focus)
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.analyse();
            self.calcule();
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // Contrat: C = entrée seulement ; CLR = expression + sorties ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "CLR", "Oublie l’expression et les sorties", Action::ClearResultats);
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();

            self.bouton_action(ui, "Analyser", "Construit le programme postfixe", Action::Analyse);
            self.bouton_action(ui, "=", "Calcule avec les valeurs saisies", Action::Calcule);
        });

        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(");
            self.bouton_insert(ui, ")", ")");
            self.bouton_insert(ui, "+", " + ");
            self.bouton_insert(ui, "-", " - ");
            self.bouton_insert(ui, "·", " \\cdot ");
            self.bouton_insert(ui, "/", " / ");
            self.bouton_insert(ui, "^", "^");

            ui.separator();

            self.bouton_insert(ui, "a/b", "\\frac{}{}");
            self.bouton_insert(ui, "√", "\\sqrt{}");
            self.bouton_insert(ui, "ⁿ√", "\\sqrt[]{}");
            self.bouton_insert(ui, "x_i", "_");
            self.bouton_insert(ui, "eq", " = ");
        });

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_variables(&mut self, ui: &mut egui::Ui) {
        if self.valeurs.is_empty() {
            ui.label("Aucune variable.");
            return;
        }

        let mut recalcule = false;
        egui::Grid::new("variables_tex")
            .num_columns(2)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for (nom, texte) in self.valeurs.iter_mut() {
                    ui.monospace(nom.as_str());
                    let resp = ui.add(
                        egui::TextEdit::singleline(texte)
                            .desired_width(140.0)
                            .hint_text("non liée"),
                    );
                    if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        recalcule = true;
                    }
                    ui.end_row();
                }
            });

        if recalcule {
            self.calcule();
        }
    }

    fn ui_sorties(&mut self, ui: &mut egui::Ui) {
        ui.label("Résultat :");
        if self.sorties.resultat.is_empty() {
            ui.monospace("indisponible");
        } else {
            Self::champ_monospace(ui, "resultat_out", &self.sorties.resultat, 1);
        }

        egui::CollapsingHeader::new("Démarche")
            .default_open(true)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Postfixe", "demarche_rpn", &self.sorties.rpn);
                Self::champ_demarche(ui, "Arbre", "demarche_arbre", &self.sorties.arbre);
                Self::champ_demarche(ui, "Texte", "demarche_texte", &self.sorties.texte);
                Self::champ_demarche(ui, "Empreinte", "demarche_empreinte", &self.sorties.empreinte);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 2);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([72.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Analyse => self.analyse(),
                Action::Calcule => self.calcule(),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            self.entree.push_str(to_insert);
            self.focus_entree = true;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Analyse,
    Calcule,
}
