/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::database::definitions::report::ReportKind;
use crate::prelude::*;
use crate::report::ReportSheet;
use rust_xlsxwriter::{Format, Workbook};

const ACTIVITY_HEADINGS: [&str; 6] = [
    "Task",
    "Status",
    "Assignee",
    "Time taken",
    "Standard time",
    "Timeliness",
];
const EMPLOYEE_HEADINGS: [&str; 6] = [
    "Task",
    "Status",
    "Activity",
    "Time taken",
    "Standard time",
    "Timeliness",
];

/// Assembles the whole workbook in memory. Nothing touches the filesystem,
/// a failed render leaves nothing behind.
#[instrument(skip_all)]
pub fn render(sheets: &[ReportSheet]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    // the format insists on at least one sheet
    if sheets.is_empty() {
        workbook.add_worksheet();
    }

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.title.as_str())?;

        let headings = match sheet.kind {
            ReportKind::Activity => &ACTIVITY_HEADINGS,
            ReportKind::Employee => &EMPLOYEE_HEADINGS,
        };
        for (column, heading) in headings.iter().enumerate() {
            worksheet.write_with_format(0, column as u16, *heading, &bold)?;
        }

        for (index, row) in sheet.rows.iter().enumerate() {
            let line = (index + 1) as u32;

            worksheet.write(line, 0, row.task.as_str())?;
            worksheet.write(line, 1, row.status.as_str())?;
            match sheet.kind {
                ReportKind::Activity => {
                    if let Some(assignee) = &row.assignee {
                        worksheet.write(line, 2, assignee.as_str())?;
                    }
                }
                ReportKind::Employee => {
                    if let Some(activity) = &row.activity {
                        worksheet.write(line, 2, activity.as_str())?;
                    }
                }
            }
            if let Some(time_taken) = row.time_taken {
                worksheet.write(line, 3, time_taken)?;
            }
            if let Some(standard_time) = row.standard_time {
                worksheet.write(line, 4, standard_time)?;
            }
            worksheet.write(line, 5, row.timeliness.to_string())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::report::tests::{activity, completed_task};
    use crate::report::{activity_sheets, ReportSheet};

    #[test]
    fn test_render_workbook() {
        let subject = activity("rec", "reconciliation", 10.0);
        let tasks = vec![
            completed_task("march run", "rec", Some(8.0)),
            completed_task("april run", "rec", Some(10.0)),
        ];

        let bytes = render(&activity_sheets(&[(subject, tasks)])).unwrap();
        // xlsx containers are zip archives
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_render_empty_workbook() {
        let sheets: Vec<ReportSheet> = Vec::new();
        let bytes = render(&sheets).unwrap();
        assert!(!bytes.is_empty());
    }
}
