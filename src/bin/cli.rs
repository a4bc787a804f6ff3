use chrono::NaiveDate;
use semester_grid::export::{export_plan_to_csv, export_plan_to_sheet_json};
use semester_grid::persistence::{load_plan_from_json, save_plan_to_json};
use semester_grid::render::{print, text};
use semester_grid::{
    BlockType, DateRange, EditorError, EntryDraft, GridCell, MeetingDetail, PlacementConflict,
    PlacementOutcome, PlanEditor, PlannerConfig, SharedPlanStore, report,
};
use std::fs;
use std::io::{self, Write};

fn parse_jp_list(s: &str) -> Option<Vec<u32>> {
    s.split(',')
        .map(|p| p.trim().parse::<u32>().ok())
        .collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show the semester grid\n  entries                                List entries as a table\n  block add <period> <slot> <type> <label...>\n                                         Block a week (types: holiday, religious, exam, activity, preparation)\n  block remove <id>                      Remove a blocked week\n  entry add <jp_csv> <chapter...>        Add an entry, one meeting per JP value (e.g. 2,2)\n  entry dates <id> <start> <end>         Set an entry's dates (YYYY-MM-DD)\n  entry delete <id>                      Delete an entry\n  meeting add <entry_id>                 Append a meeting to an entry\n  meeting remove <entry_id> <meeting_id> Remove a meeting from an entry\n  plot <entry_id> <period> <slot>        Toggle a week for an entry\n  suggest                                Show the next meeting number and dates\n  export <csv|sheet|html> <path>         Export the grid (sheet: JSON rows with merges)\n  save json <path>                       Save the plan to a JSON file\n  load json <path>                       Load the plan from a JSON file\n  quit|exit                              Exit"
    );
}

fn print_outcome(entry_id: u32, cell: GridCell, outcome: PlacementOutcome) {
    match outcome {
        PlacementOutcome::Added => println!("Plotted week {cell} for entry {entry_id}."),
        PlacementOutcome::Removed => println!("Removed week {cell} from entry {entry_id}."),
        PlacementOutcome::Rejected { conflict } => match conflict {
            PlacementConflict::Blocked => println!("Week {cell} is blocked; nothing changed."),
            PlacementConflict::OccupiedBy { entry_id: owner } => {
                println!("Week {cell} is already used by entry {owner}; nothing changed.")
            }
            PlacementConflict::OutOfGrid => {
                println!("Week {cell} is outside the semester grid; nothing changed.")
            }
        },
    }
}

fn show(editor: &PlanEditor<SharedPlanStore>) {
    println!("{}", text::render_grid(&editor.layout()));
}

fn create_entry_from_jps(
    editor: &mut PlanEditor<SharedPlanStore>,
    jps: &[u32],
    chapter: &str,
) -> Result<u32, EditorError> {
    let mut draft: EntryDraft = editor.prepare_entry_draft()?;
    draft.chapter = chapter.to_string();
    let mut details = Vec::with_capacity(jps.len());
    for (idx, jp) in jps.iter().enumerate() {
        let number = match draft.meeting_details.first() {
            Some(reserved) if idx == 0 => reserved.number,
            _ => editor.reserve_meeting_number()?,
        };
        details.push(MeetingDetail::new(idx as u32 + 1, number, *jp));
    }
    draft.meeting_details = details;
    editor.create_entry(draft)
}

fn add_entry(editor: &mut PlanEditor<SharedPlanStore>, jps: &[u32], chapter: &str) {
    match create_entry_from_jps(editor, jps, chapter) {
        Ok(entry_id) => {
            let label = editor
                .plan()
                .entry(entry_id)
                .map(|entry| entry.meeting_no())
                .unwrap_or_default();
            println!("Created entry {entry_id} ({label}).");
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn set_entry_dates(editor: &mut PlanEditor<SharedPlanStore>, entry_id: u32, range: DateRange) {
    let Some(entry) = editor.plan().entry(entry_id) else {
        println!("Error: entry {entry_id} not found");
        return;
    };
    let mut draft = EntryDraft::new(entry.chapter.clone(), entry.meeting_details.clone());
    draft.topic = entry.topic.clone();
    draft.date_range = Some(range);
    match editor.update_entry(entry_id, draft) {
        Ok(()) => println!("Dates set for entry {entry_id}."),
        Err(e) => println!("Error: {e}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PlannerConfig::load()?;
    config.init_tracing();
    let fallback = config.new_plan()?;
    let mut editor = PlanEditor::open_or_create(config.open_store()?, || fallback)?;

    println!("Semester Grid (CLI) - type 'help' for commands\n");
    show(&editor);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show(&editor),
            "entries" => match report::entries_frame(editor.plan()) {
                Ok(df) => println!("{}", report::render_frame(&df)),
                Err(e) => println!("Error: {e}"),
            },
            "block" => match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some("add"), Some(period_s), Some(slot_s), Some(type_s)) => {
                    let (Ok(period), Ok(slot)) = (period_s.parse::<u8>(), slot_s.parse::<u8>())
                    else {
                        println!("Invalid period or slot");
                        continue;
                    };
                    let block_type = match type_s.parse::<BlockType>() {
                        Ok(block_type) => block_type,
                        Err(e) => {
                            println!("Error: {e}");
                            continue;
                        }
                    };
                    let label = parts.collect::<Vec<_>>().join(" ");
                    match editor.add_block(GridCell::new(period, slot), block_type, &label) {
                        Ok(id) => {
                            println!("Blocked week {} as block {id}.", GridCell::new(period, slot));
                            show(&editor);
                        }
                        Err(e) => println!("Error: {e}"),
                    }
                }
                (Some("remove"), Some(id_s), None, None) => {
                    let Ok(id) = id_s.parse::<u32>() else {
                        println!("Invalid id");
                        continue;
                    };
                    match editor.remove_block(id) {
                        Ok(true) => println!("Removed block {id}."),
                        Ok(false) => println!("No block {id}; nothing changed."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!(
                    "Usage: block add <period> <slot> <type> <label...> | block remove <id>"
                ),
            },
            "entry" => match parts.next() {
                Some("add") => {
                    let Some(jps) = parts.next().and_then(parse_jp_list) else {
                        println!("Usage: entry add <jp_csv> <chapter...>");
                        continue;
                    };
                    let chapter = parts.collect::<Vec<_>>().join(" ");
                    add_entry(&mut editor, &jps, &chapter);
                }
                Some("dates") => {
                    let id = parts.next().and_then(|s| s.parse::<u32>().ok());
                    let start = parts.next().and_then(parse_date);
                    let end = parts.next().and_then(parse_date);
                    match (id, start, end) {
                        (Some(id), Some(start), Some(end)) => {
                            set_entry_dates(&mut editor, id, DateRange::new(start, end))
                        }
                        _ => println!("Usage: entry dates <id> <YYYY-MM-DD> <YYYY-MM-DD>"),
                    }
                }
                Some("delete") => {
                    let Some(id) = parts.next().and_then(|s| s.parse::<u32>().ok()) else {
                        println!("Usage: entry delete <id>");
                        continue;
                    };
                    match editor.delete_entry(id) {
                        Ok(true) => println!("Deleted entry {id}."),
                        Ok(false) => println!("Error: entry {id} not found"),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: entry <add|dates|delete> ..."),
            },
            "meeting" => {
                let action = parts.next();
                let entry_id = parts.next().and_then(|s| s.parse::<u32>().ok());
                let meeting_id = parts.next().and_then(|s| s.parse::<u32>().ok());
                match (action, entry_id, meeting_id) {
                    (Some("add"), Some(entry_id), None) => {
                        match editor.add_meeting_detail(entry_id) {
                            Ok(meeting_id) => {
                                println!("Added meeting {meeting_id} to entry {entry_id}.")
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    (Some("remove"), Some(entry_id), Some(meeting_id)) => {
                        match editor.remove_meeting_detail(entry_id, meeting_id) {
                            Ok(true) => {
                                println!("Removed meeting {meeting_id} from entry {entry_id}.")
                            }
                            Ok(false) => println!("Meeting {meeting_id} was not removed."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!(
                        "Usage: meeting add <entry_id> | meeting remove <entry_id> <meeting_id>"
                    ),
                }
            }
            "plot" => {
                let entry_id = parts.next().and_then(|s| s.parse::<u32>().ok());
                let period = parts.next().and_then(|s| s.parse::<u8>().ok());
                let slot = parts.next().and_then(|s| s.parse::<u8>().ok());
                match (entry_id, period, slot) {
                    (Some(entry_id), Some(period), Some(slot)) => {
                        let cell = GridCell::new(period, slot);
                        match editor.toggle_plot(entry_id, cell) {
                            Ok(outcome) => {
                                print_outcome(entry_id, cell, outcome);
                                if outcome.changed() {
                                    show(&editor);
                                }
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: plot <entry_id> <period> <slot>"),
                }
            }
            "suggest" => {
                let plan = editor.plan();
                println!("Next meeting: P{}", plan.next_meeting_number());
                match plan.suggest_next_dates().or_else(|| plan.first_free_week()) {
                    Some(range) => println!("Suggested dates: {} to {}", range.start, range.end),
                    None => println!("No date suggestion available."),
                }
            }
            "export" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => match export_plan_to_csv(editor.plan(), path) {
                    Ok(()) => println!("Grid exported to {path}."),
                    Err(e) => println!("Error: {e}"),
                },
                (Some("sheet"), Some(path)) => match export_plan_to_sheet_json(editor.plan(), path) {
                    Ok(()) => println!("Grid exported to {path}."),
                    Err(e) => println!("Error: {e}"),
                },
                (Some("html"), Some(path)) => {
                    let document = print::render_document(&editor.layout());
                    match fs::write(path, document) {
                        Ok(()) => println!("Grid exported to {path}."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: export <csv|sheet|html> <path>"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match save_plan_to_json(editor.plan(), path) {
                    Ok(()) => println!("Plan saved to {path}."),
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: save json <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => {
                    let loaded = load_plan_from_json(path).map_err(EditorError::from);
                    match loaded.and_then(|plan| editor.replace_plan(plan)) {
                        Ok(()) => {
                            println!("Plan loaded from {path}.");
                            show(&editor);
                        }
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: load json <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
