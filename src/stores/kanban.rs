//! Kanban board store.
//!
//! Columns are shared by all boards. A task's `status` holds the id of the
//! column it sits in; the id is taken as given and not checked.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::ids::{IdIssuer, IdKind, max_sequence};
use crate::models::{Board, Column, ColumnView, Comment, NewTask, Task, TaskPatch, WorkCategory};
use crate::seed;
use crate::state::Observable;

pub struct KanbanModel {
    boards: Observable<Vec<Board>>,
    columns: Observable<Vec<Column>>,
    tasks: Observable<Vec<Task>>,
    comments: Observable<Vec<Comment>>,
    ids: Arc<IdIssuer>,
    clock: Arc<dyn Clock>,
}

impl KanbanModel {
    pub fn new(ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        let boards = seed::boards();
        let columns = seed::columns();
        let tasks = seed::tasks();
        ids.reserve_through(IdKind::Board, max_sequence(boards.iter().map(|b| b.id.as_str())));
        ids.reserve_through(IdKind::Column, max_sequence(columns.iter().map(|c| c.id.as_str())));
        ids.reserve_through(IdKind::Task, max_sequence(tasks.iter().map(|t| t.id.as_str())));

        Self {
            boards: Observable::new(boards),
            columns: Observable::new(columns),
            tasks: Observable::new(tasks),
            comments: Observable::default(),
            ids,
            clock,
        }
    }

    pub fn boards(&self) -> Vec<Board> {
        self.boards.get()
    }

    pub fn columns(&self) -> Vec<Column> {
        self.columns.get()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.get()
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.tasks.with(|list| list.iter().find(|t| t.id == id).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    pub fn add_board(&self, name: &str, category: Option<WorkCategory>) -> String {
        let id = self.ids.next_short(IdKind::Board);
        let board = Board {
            id: id.clone(),
            name: name.to_string(),
            category,
            created_at: Some(self.clock.today()),
        };
        info!("Board {} created: {}", id, name);
        self.boards.update(|list| list.push(board));
        id
    }

    pub fn add_column(&self, title: &str) -> String {
        let id = self.ids.next_short(IdKind::Column);
        let column = Column {
            id: id.clone(),
            title: title.to_string(),
        };
        debug!("Column {} added: {}", id, title);
        self.columns.update(|list| list.push(column));
        id
    }

    pub fn add_task(&self, new: NewTask) -> String {
        let id = self.ids.next_short(IdKind::Task);
        let task = Task {
            id: id.clone(),
            title: new.title,
            owner: new.owner,
            description: new.description,
            priority: new.priority,
            status: new.status,
            board_id: new.board_id,
            category: new.category,
            due_date: new.due_date,
            created_at: Some(self.clock.today()),
        };
        info!("Task {} added to board {} in {}", id, task.board_id, task.status);
        self.tasks.update(|list| list.push(task));
        id
    }

    pub fn update_task(&self, id: &str, patch: TaskPatch) -> bool {
        self.modify_task(id, |task| patch.apply_to(task))
    }

    /// Put a task into another column.
    pub fn move_task(&self, id: &str, column_id: &str) -> bool {
        let moved = self.modify_task(id, |task| task.status = column_id.to_string());
        if moved {
            info!("Task {} moved to {}", id, column_id);
        }
        moved
    }

    /// Delete a task together with its comments.
    pub fn delete_task(&self, id: &str) -> bool {
        let removed = self.tasks.update_if(|list| {
            let before = list.len();
            list.retain(|t| t.id != id);
            list.len() != before
        });
        if removed {
            self.comments.update_if(|list| {
                let before = list.len();
                list.retain(|c| c.task_id != id);
                list.len() != before
            });
            info!("Task {} deleted", id);
        }
        removed
    }

    pub fn add_comment(&self, task_id: &str, content: &str) -> String {
        let id = self.ids.next_short(IdKind::Comment);
        let comment = Comment {
            id: id.clone(),
            task_id: task_id.to_string(),
            content: content.to_string(),
            created_at: self.clock.today(),
        };
        debug!("Comment {} on task {}", id, task_id);
        self.comments.update(|list| list.push(comment));
        id
    }

    pub fn comments_for(&self, task_id: &str) -> Vec<Comment> {
        self.comments.with(|list| list.iter().filter(|c| c.task_id == task_id).cloned().collect())
    }

    /// Every column with the tasks of `board_id` that sit in it.
    pub fn board_view(&self, board_id: &str) -> Vec<ColumnView> {
        let tasks = self.tasks.get();
        self.columns.with(|columns| {
            columns
                .iter()
                .map(|column| ColumnView {
                    column: column.clone(),
                    items: tasks
                        .iter()
                        .filter(|t| t.board_id == board_id && t.status == column.id)
                        .cloned()
                        .collect(),
                })
                .collect()
        })
    }

    fn modify_task(&self, id: &str, f: impl FnOnce(&mut Task)) -> bool {
        self.tasks.update_if(|list| match list.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        })
    }
}
