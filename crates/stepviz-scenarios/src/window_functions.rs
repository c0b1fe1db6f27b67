//! Funciones de ventana sobre la tabla de posiciones: primero se ordena la
//! ventana y luego se calcula la columna fila a fila.
use serde::Serialize;
use stepviz_core::{step, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{RankedRow, Standings, WindowFunc};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowCell {
    pub team: String,
    pub group: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowBag {
    pub func: WindowFunc,
    pub partitioned: bool,
    /// Equipos en el orden de la ventana, tras el paso de ordenación.
    pub order: Vec<String>,
    pub results: Vec<WindowCell>,
}

#[derive(Debug)]
struct WindowRowStep {
    id: String,
    func: WindowFunc,
    row: RankedRow,
    /// Empata en puntos con la fila anterior de su partición.
    tie: bool,
}

impl StepDefinition<WindowBag> for WindowRowStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag(&self) -> StepTag {
        StepTag::Other("window".into())
    }

    fn highlights(&self) -> Vec<Highlight> {
        let mut keys = vec![self.row.standing.team.clone()];
        match self.func {
            WindowFunc::Lead => keys.extend(self.row.lead.clone()),
            WindowFunc::Lag => keys.extend(self.row.lag.clone()),
            _ => {}
        }
        vec![Highlight::new("standings", keys)]
    }

    fn apply(&self, bag: &WindowBag) -> StepOutcome<WindowBag> {
        let s = &self.row.standing;
        let value = self.row.value_of(self.func);
        let detail = match self.func {
            WindowFunc::RowNumber => "every row gets the next number, ties or not".to_string(),
            WindowFunc::Rank if self.tie => format!("{} points ties the previous row, so the rank repeats", s.points),
            WindowFunc::Rank => "the rank jumps to the row position, skipping tied slots".to_string(),
            WindowFunc::DenseRank if self.tie => format!("{} points ties the previous row, so the rank repeats", s.points),
            WindowFunc::DenseRank => "the next consecutive rank, with no gaps".to_string(),
            WindowFunc::Lead if self.row.lead.is_none() => "no following row in the window".to_string(),
            WindowFunc::Lead => "value taken from the following row".to_string(),
            WindowFunc::Lag if self.row.lag.is_none() => "no preceding row in the window".to_string(),
            WindowFunc::Lag => "value taken from the preceding row".to_string(),
        };
        let mut next = bag.clone();
        next.results.push(WindowCell { team: s.team.clone(),
                                       group: s.group.clone(),
                                       value: value.clone() });
        let text = format!("{} ({} pts, group {}): {} = {value}; {detail}.",
                           s.team,
                           s.points,
                           s.group,
                           self.func.sql());
        StepOutcome::new(next, format!("Row {}: {}", self.row.row_number, s.team), text)
    }
}

/// Paso de ordenación y un paso por fila.
pub fn scenario(func: WindowFunc, partitioned: bool) -> Scenario<WindowBag> {
    let standings = Standings::world_cup();
    let ranked = standings.rank(partitioned);
    let order: Vec<String> = ranked.iter().map(|r| r.standing.team.clone()).collect();

    let over = if partitioned {
        "PARTITION BY group ORDER BY points DESC, nrr DESC"
    } else {
        "ORDER BY points DESC, nrr DESC"
    };
    let sort = step("sort", move |bag: &WindowBag| {
                   let next = WindowBag { order: order.clone(),
                                          ..bag.clone() };
                   StepOutcome::new(next,
                                    "Sort the Window",
                                    format!("Rows are arranged {over} before any value is computed."))
               }).tagged(StepTag::Scan);

    let rows = ranked.iter()
                     .enumerate()
                     .map(|(i, row)| {
                         let tie = i > 0
                                   && row.row_number > 1
                                   && ranked[i - 1].standing.points == row.standing.points;
                         WindowRowStep { id: format!("row_{}", i + 1),
                                         func,
                                         row: row.clone(),
                                         tie }
                     })
                     .map(|s| Box::new(s) as Box<dyn StepDefinition<WindowBag>>)
                     .collect::<Vec<_>>();

    Scenario::builder("window_functions",
                      WindowBag { func,
                                  partitioned,
                                  order: Vec::new(),
                                  results: Vec::new() })
        .title("Window functions")
        .intro("Ready", format!("SELECT team, {} OVER ({over}) FROM standings", func.sql()))
        .dataset_hash(standings.dataset_hash())
        .step(sort)
        .steps(rows)
        .build()
}
