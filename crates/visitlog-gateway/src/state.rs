use visitlog_core::VisitService;

#[derive(Clone)]
pub struct AppState {
    visits: VisitService,
}

impl AppState {
    pub fn new(visits: VisitService) -> Self {
        Self { visits }
    }

    pub fn visits(&self) -> &VisitService {
        &self.visits
    }
}
